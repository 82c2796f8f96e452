use nm_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidPosition(#[from] CoreError),

    #[error("agent {0} not found")]
    NotFound(AgentId),
}

pub type StoreResult<T> = Result<T, StoreError>;
