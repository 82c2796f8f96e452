use nm_core::CoreError;
use thiserror::Error;

/// Why a match request produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("rider position rejected: {0}")]
    InvalidPosition(#[from] CoreError),

    #[error("invalid search radius {0} km: must be a non-negative number")]
    InvalidRadius(f64),

    #[error("no available agent matches the request")]
    NoAvailableAgent,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("feed CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
