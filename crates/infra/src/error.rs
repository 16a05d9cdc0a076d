//! Service-level error: domain rejections plus infrastructure failures.

use thiserror::Error;

use stockval_core::DomainError;

use crate::event_store::EventStoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// A stored payload could not be read back into the aggregate event type.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// The operation lost a race against a concurrent writer of the same stream.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ServiceError::Store(EventStoreError::Concurrency(_))
                | ServiceError::Domain(DomainError::Conflict(_))
        )
    }

    /// The domain error behind this failure, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            _ => None,
        }
    }
}
