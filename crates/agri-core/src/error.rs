//! Centralized error types for the AgriAssist service.
//!
//! Every handler failure is converted into [`AppError`], which knows:
//! - the HTTP status code the failure surfaces as
//! - a short user-facing message
//! - the full detail for the response body and logs

use thiserror::Error;

/// Top-level application error type.
///
/// Crate-local errors (store, weather) are mapped into this type at the HTTP
/// boundary. Use `status_code()` to pick the response status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreFailure),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error for the named resource (e.g. "Task").
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Config(_) => 500,
            AppError::Store(_) => 500,
            AppError::Upstream(e) => e.status_code(),
            AppError::NotFound(_) => 404,
            AppError::InvalidRequest(_) => 422,
            AppError::Other(_) => 500,
        }
    }

    /// Returns a short, non-technical message.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Store(e) => e.user_message(),
            AppError::Upstream(e) => e.user_message(),
            AppError::NotFound(_) => "The requested item does not exist.",
            AppError::InvalidRequest(_) => "The request was malformed. Check the input.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Whether the failure is the server's fault (logged at error level).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A secret (API key) the operation needs is absent.
    #[error("{0} not configured")]
    MissingSecret(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSecret(_) => {
                "The service is not fully configured. Contact the administrator."
            }
        }
    }
}

/// Document store failures, as reported to callers.
#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error("Failed to {action}: {message}")]
    Read { action: String, message: String },

    #[error("Failed to {action}: {message}")]
    Write { action: String, message: String },
}

impl StoreFailure {
    pub fn read(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            action: action.into(),
            message: message.into(),
        }
    }

    pub fn write(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            action: action.into(),
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            StoreFailure::Read { .. } => "Unable to load data. Please try again.",
            StoreFailure::Write { .. } => "Unable to save changes. Please try again.",
        }
    }
}

/// Third-party provider errors (weather API).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} rate limit exceeded. Please try again in a few minutes.")]
    RateLimited { service: String },

    #[error("Failed to fetch {what}: {message}")]
    FetchFailed { what: String, message: String },
}

impl UpstreamError {
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::RateLimited { .. } => 429,
            UpstreamError::FetchFailed { .. } => 500,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::RateLimited { .. } => {
                "Too many requests to the provider. Please wait and try again."
            }
            UpstreamError::FetchFailed { .. } => {
                "The external service is unavailable. Please try again later."
            }
        }
    }
}
