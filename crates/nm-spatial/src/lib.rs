//! `nm-spatial`: incremental nearest-agent index.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`index`]  | `SpatialIndex` (R-tree over unit-sphere vectors), `Hit`   |
//! | [`error`]  | `SpatialError`, `SpatialResult<T>`                        |
//!
//! The index is a derived view of an `nm_store::AgentStore`: feed it every
//! [`StoreEvent`](nm_store::StoreEvent) via [`SpatialIndex::apply`] and it
//! stays in sync without ever owning agent lifecycle.

pub mod error;
pub mod index;


pub use error::{SpatialError, SpatialResult};
pub use index::{Hit, SpatialIndex};
