use crate::store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Invariant violated: {0}")]
    InvariantViolated(String),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Upstream name conflict: {0}")]
    UpstreamConflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for OrchestratorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => OrchestratorError::NotFound(msg),
            StoreError::Conflict(msg) => OrchestratorError::UpstreamConflict(msg),
            StoreError::Unavailable(msg) => OrchestratorError::UpstreamFailure(msg),
        }
    }
}
