//! `nm-core`: foundational types for the `rust_nearmatch` matching service.
//!
//! This crate is a dependency of every other `nm-*` crate.  It intentionally
//! has no `nm-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`geo`]         | `GeoPoint`, haversine distance, `DistanceUnit`        |
//! | [`time`]        | `Timestamp`, `Staleness`, `Clock` implementations     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{DistanceUnit, GeoPoint, EARTH_RADIUS_KM};
pub use ids::AgentId;
pub use time::{Clock, ManualClock, Staleness, SystemClock, Timestamp};
