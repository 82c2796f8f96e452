//! `nm-match`: nearest-agent matching over a live fleet.
//!
//! # Request flow
//!
//! ```text
//! feed ──AgentUpdate──▶ Fleet::apply ─┬─▶ AgentStore   (validate, order)
//!                                     └─▶ SpatialIndex (apply StoreEvent)
//!
//! rider ──MatchQuery──▶ MatchRequestHandler::match_query
//!                         └─ Fleet::read ─▶ SpatialIndex::nearest
//!                                            (predicate: fresh ∧ filters)
//! ```
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`fleet`]   | `Fleet` (store + index behind one `RwLock`), `IngestReport` |
//! | [`handler`] | `MatchRequestHandler`, `MatchQuery`, `MatchFilters`, `MatchResult` |
//! | [`feed`]    | `AgentFeed` trait, `CsvAgentFeed`, `StaticFeed`            |
//! | [`config`]  | `MatchConfig` (TOML)                                      |
//! | [`error`]   | `MatchError`, `FeedError`, `ConfigError`                  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nm_core::{GeoPoint, SystemClock};
//! use nm_match::{CsvAgentFeed, Fleet, MatchConfig, MatchRequestHandler};
//!
//! let config = MatchConfig::load("nearmatch.toml".as_ref())?;
//! let fleet = Arc::new(Fleet::new());
//! fleet.ingest(&CsvAgentFeed::from_path("drivers.csv"))?;
//!
//! let handler = MatchRequestHandler::new(fleet, Arc::new(SystemClock), &config);
//! // Config defaults: availability, radius cap.
//! let m = handler.match_default(GeoPoint::new(30.0, 31.2))?;
//! println!("closest driver: {} at {:.2} km", m.agent, m.distance_km);
//!
//! // Per-request filters replace the defaults entirely.
//! let filters = handler.default_filters().clone().excluding([m.agent]);
//! let next = handler.match_rider(GeoPoint::new(30.0, 31.2), &filters)?;
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod fleet;
pub mod handler;


pub use config::MatchConfig;
pub use error::{ConfigError, FeedError, MatchError};
pub use feed::{AgentFeed, CsvAgentFeed, StaticFeed, read_updates};
pub use fleet::{Fleet, IngestReport};
pub use handler::{MatchFilters, MatchQuery, MatchRequestHandler, MatchResult};
