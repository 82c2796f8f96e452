//! Service configuration.
//!
//! Loaded from TOML by the application and handed to
//! [`MatchRequestHandler::new`](crate::MatchRequestHandler::new).  Every key
//! is optional:
//!
//! ```toml
//! # Agents silent for longer than this are never matched.
//! # Omit to match regardless of age.
//! staleness_secs    = 60
//! distance_unit     = "kilometres"   # "metres" | "miles"
//! require_available = true
//! max_distance_km   = 15.0
//! ```

use std::path::Path;

use serde::Deserialize;

use nm_core::{DistanceUnit, Staleness};

use crate::{ConfigError, MatchFilters};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Staleness window in seconds.  `None` disables the staleness check.
    pub staleness_secs: Option<u64>,

    /// Unit for presenting distances.  Results always carry kilometres.
    pub distance_unit: DistanceUnit,

    /// Default for [`MatchFilters::require_available`].
    pub require_available: bool,

    /// Default for [`MatchFilters::max_distance_km`].
    pub max_distance_km: Option<f64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            staleness_secs: None,
            distance_unit: DistanceUnit::Kilometres,
            require_available: true,
            max_distance_km: None,
        }
    }
}

impl MatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(r) = self.max_distance_km {
            if !r.is_finite() || r < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_distance_km must be a non-negative number, got {r}"
                )));
            }
        }
        Ok(())
    }

    pub fn staleness(&self) -> Staleness {
        match self.staleness_secs {
            Some(secs) => Staleness::from_secs(secs),
            None => Staleness::Unbounded,
        }
    }

    /// Filters applied when a caller does not supply its own.
    pub fn default_filters(&self) -> MatchFilters {
        MatchFilters {
            require_available: self.require_available,
            max_distance_km: self.max_distance_km,
            exclude: Vec::new(),
        }
    }
}
