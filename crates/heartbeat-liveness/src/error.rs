//! Error taxonomy for heartbeat operations.

use heartbeat_state::StateError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed caller input. Never retried.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The heartbeat was never registered, or its validity window has passed.
    #[error("heartbeat not found")]
    NotFoundOrExpired,

    /// The store failed. Not retried here; callers may re-issue.
    #[error("storage error: {0}")]
    Storage(#[from] StateError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation { .. })
    }
}

pub(crate) fn validate_id(id: &str) -> ServiceResult<()> {
    if id.trim().is_empty() {
        return Err(ServiceError::validation("id", "identifier is required"));
    }
    Ok(())
}
