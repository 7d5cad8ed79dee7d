use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Not found: {id}")]
    NotFound { id: String },

    #[error("Internal error in {stage}: {reason}")]
    InternalError { stage: String, reason: String },

    #[error("Concurrency conflict: expected version {expected}, got {actual}")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl DomainError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound { id: id.into() }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

impl ApplicationError {
    /// True when the underlying cause is a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplicationError::Domain(DomainError::NotFound { .. }))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
