//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `nm-spatial`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpatialError {
    #[error("no indexed agent satisfies the query")]
    EmptyIndex,
}

pub type SpatialResult<T> = Result<T, SpatialError>;
