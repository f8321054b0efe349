#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{
    Config, ListFailurePolicy, NewsConfig, ServerConfig, StorageConfig, TasksConfig,
    ValidationResult, WeatherConfig, MAX_NEWS_ARTICLES,
};
pub use error::{AppError, ConfigError, StoreFailure, UpstreamError};
pub use secrets::{EnvSecrets, SecretProvider, StaticSecrets};

use anyhow::Result;

/// Initialize logging for the service.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("AgriAssist core initialized");
    Ok(())
}
