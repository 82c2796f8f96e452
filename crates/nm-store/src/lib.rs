//! `nm-store`: the authoritative agent registry.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`agent`]   | `Agent` record, `AgentUpdate` feed tuple                 |
//! | [`event`]   | `StoreEvent`, the update stream consumed by indexes      |
//! | [`store`]   | `AgentStore`, `ActiveAgents` lazy iterator               |
//! | [`error`]   | `StoreError`, `StoreResult<T>`                           |
//!
//! Every mutating call returns a [`StoreEvent`].  Derived views (the spatial
//! index in `nm-spatial`) apply these events to stay synchronised; the store
//! itself never holds a reference to them.

pub mod agent;
pub mod error;
pub mod event;
pub mod store;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentUpdate};
pub use error::{StoreError, StoreResult};
pub use event::StoreEvent;
pub use store::{ActiveAgents, AgentStore};
