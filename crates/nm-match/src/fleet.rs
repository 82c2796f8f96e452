//! `Fleet`: the live agent set shared between the feed and match requests.
//!
//! # Locking
//!
//! The authoritative [`AgentStore`] and the derived [`SpatialIndex`] sit
//! behind a single `parking_lot::RwLock`.  Every mutation updates both under
//! one write guard, so a reader can never see an agent in one and not the
//! other.  Write sections are a hash-map update plus an O(log n) tree
//! delete/insert and never do I/O: [`Fleet::ingest`] fetches from its feed
//! before taking the lock and then locks once per update, letting queued
//! readers in between.  `parking_lot`'s lock is eventually fair, so a busy
//! feed cannot starve match requests or the other way round.
//!
//! A reader that acquires the lock after a `remove` returned never sees the
//! removed agent.

use parking_lot::RwLock;
use tracing::{info, warn};

use nm_core::{AgentId, CoreError, GeoPoint, Staleness, Timestamp};
use nm_spatial::SpatialIndex;
use nm_store::{Agent, AgentStore, AgentUpdate, StoreError, StoreEvent, StoreResult};

use crate::{AgentFeed, FeedError};

struct FleetState {
    store: AgentStore,
    index: SpatialIndex,
}

impl FleetState {
    fn record(&mut self, event: StoreEvent) -> StoreEvent {
        self.index.apply(&event);
        debug_assert_eq!(self.store.len(), self.index.len());
        event
    }
}

/// Summary of one [`Fleet::ingest`] / [`Fleet::apply_batch`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    /// Updates that inserted, moved or refreshed an agent.
    pub applied: usize,
    /// Updates discarded as older than the stored record.
    pub ignored: usize,
    /// Updates rejected for invalid coordinates.
    pub rejected: Vec<(AgentId, CoreError)>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.applied + self.ignored + self.rejected.len()
    }
}

pub struct Fleet {
    state: RwLock<FleetState>,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self::from_store(AgentStore::new())
    }

    /// Adopt an already populated store; the index is bulk-loaded from it.
    pub fn from_store(store: AgentStore) -> Self {
        let index = SpatialIndex::from_store(&store);
        Self { state: RwLock::new(FleetState { store, index }) }
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub fn upsert(&self, id: AgentId, position: GeoPoint, timestamp: Timestamp) -> StoreResult<StoreEvent> {
        self.apply(AgentUpdate::position(id, position, timestamp))
    }

    pub fn apply(&self, update: AgentUpdate) -> StoreResult<StoreEvent> {
        let mut state = self.state.write();
        let event = state.store.apply(update)?;
        Ok(state.record(event))
    }

    pub fn set_available(&self, id: AgentId, available: bool, timestamp: Timestamp) -> StoreResult<StoreEvent> {
        let mut state = self.state.write();
        let event = state.store.set_available(id, available, timestamp)?;
        Ok(state.record(event))
    }

    /// Deregister `id`.  Returns `false` if it was not registered.
    pub fn remove(&self, id: AgentId) -> bool {
        let mut state = self.state.write();
        match state.store.remove(id) {
            Some(event) => {
                state.record(event);
                true
            }
            None => false,
        }
    }

    /// Remove every agent whose last update is stale at `now`.
    ///
    /// Returns the evicted ids in ascending order.  With
    /// [`Staleness::Unbounded`] nothing is ever evicted.
    pub fn evict_stale(&self, now: Timestamp, staleness: Staleness) -> Vec<AgentId> {
        let mut state = self.state.write();
        let stale = state.store.stale_ids(now, staleness);
        for &id in &stale {
            if let Some(event) = state.store.remove(id) {
                state.record(event);
            }
        }
        if !stale.is_empty() {
            info!(evicted = stale.len(), %now, %staleness, "evicted stale agents");
        }
        stale
    }

    /// Apply a batch of updates, rejecting invalid rows individually.
    pub fn apply_batch<I>(&self, updates: I) -> IngestReport
    where
        I: IntoIterator<Item = AgentUpdate>,
    {
        let mut report = IngestReport::default();
        for update in updates {
            let id = update.id;
            match self.apply(update) {
                Ok(event) if event.is_ignored() => report.ignored += 1,
                Ok(_) => report.applied += 1,
                Err(StoreError::InvalidPosition(e)) => {
                    warn!(%id, error = %e, "rejected feed update");
                    report.rejected.push((id, e));
                }
                // `apply` inserts absent agents, so it cannot report NotFound.
                Err(StoreError::NotFound(_)) => {}
            }
        }
        report
    }

    /// Pull the current snapshot from `feed` and apply it.
    pub fn ingest(&self, feed: &dyn AgentFeed) -> Result<IngestReport, FeedError> {
        let updates = feed.fetch()?;
        let report = self.apply_batch(updates);
        info!(
            applied = report.applied,
            ignored = report.ignored,
            rejected = report.rejected.len(),
            fleet = self.len(),
            "feed ingested"
        );
        Ok(report)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Run `f` against one consistent snapshot of store and index.
    pub fn read<R>(&self, f: impl FnOnce(&AgentStore, &SpatialIndex) -> R) -> R {
        let state = self.state.read();
        f(&state.store, &state.index)
    }

    /// A copy of the agent's current record.
    pub fn get(&self, id: AgentId) -> StoreResult<Agent> {
        self.state.read().store.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.state.read().store.contains(id)
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet").field("agents", &self.len()).finish()
    }
}

