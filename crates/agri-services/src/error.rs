//! Service-level errors.

use agri_core::{AppError, StoreFailure};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to {action}: {source}")]
    Read {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to {action}: {source}")]
    Write {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn read(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Read { action, source }
    }

    pub fn write(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Write { action, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Read { action, source } => {
                AppError::Store(StoreFailure::read(action, source.to_string()))
            }
            ServiceError::Write { action, source } => {
                AppError::Store(StoreFailure::write(action, source.to_string()))
            }
            ServiceError::NotFound(resource) => AppError::not_found(resource),
            ServiceError::Join(e) => AppError::Other(anyhow::anyhow!("store task failed: {}", e)),
        }
    }
}
