//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so a coordinate rejected here surfaces unchanged
//! at every layer above.

use thiserror::Error;

/// Errors produced by `nm-core` value constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid position ({lat}, {lon}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidPosition { lat: f64, lon: f64 },
}

/// Shorthand result type for `nm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
