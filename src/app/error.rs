use crate::storage::StoreError;
use thiserror::Error;

/// Failures a service call can end with. Row-level import problems are not
/// here; they are reported as [`crate::domain::import::ImportError`] values.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// The caller sent something the service cannot accept.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::InvalidInput(msg),
            StoreError::Backend(err) => ServiceError::Storage(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
