//! `AgentStore`: authoritative `AgentId → Agent` mapping.
//!
//! # Ordering
//!
//! Feeds may deliver updates for one agent out of order.  The store keeps the
//! newest timestamp it has seen per agent and discards any update that is
//! strictly older.  An update with an *equal* timestamp is applied, so
//! replaying an identical update leaves the record unchanged and replaying
//! a corrected one at the same instant wins.
//!
//! # Hashing
//!
//! Keys are small integers; `FxHashMap` is roughly 2× faster than SipHash on
//! the lookup-heavy match path and HashDoS is not a concern for internally
//! assigned ids.

use std::collections::hash_map::{self, Entry};

use rustc_hash::FxHashMap;
use tracing::debug;

use nm_core::{AgentId, GeoPoint, Staleness, Timestamp};

use crate::{Agent, AgentUpdate, StoreError, StoreEvent, StoreResult};

#[derive(Default)]
pub struct AgentStore {
    agents: FxHashMap<AgentId, Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            agents: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Insert or move `id` to `position` as of `timestamp`.
    ///
    /// Availability and label are left as stored (new agents start
    /// available).  See [`apply`](Self::apply) for the full update tuple.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidPosition`] if the coordinates are out of range;
    /// the store is not modified.
    pub fn upsert(
        &mut self,
        id: AgentId,
        position: GeoPoint,
        timestamp: Timestamp,
    ) -> StoreResult<StoreEvent> {
        self.apply(AgentUpdate::position(id, position, timestamp))
    }

    /// Apply one feed update and return the resulting [`StoreEvent`].
    pub fn apply(&mut self, update: AgentUpdate) -> StoreResult<StoreEvent> {
        update.position.validate()?;
        let AgentUpdate { id, position, timestamp, available, label } = update;

        let event = match self.agents.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(Agent {
                    id,
                    position,
                    last_update: timestamp,
                    available: available.unwrap_or(true),
                    label,
                });
                StoreEvent::Inserted { id, position }
            }
            Entry::Occupied(mut slot) => {
                let agent = slot.get_mut();
                if timestamp < agent.last_update {
                    debug!(%id, stored = %agent.last_update, got = %timestamp, "ignoring out-of-order update");
                    return Ok(StoreEvent::Ignored { id });
                }
                let from = agent.position;
                agent.position = position;
                agent.last_update = timestamp;
                if let Some(available) = available {
                    agent.available = available;
                }
                if label.is_some() {
                    agent.label = label;
                }
                if from == position {
                    StoreEvent::Refreshed { id }
                } else {
                    StoreEvent::Moved { id, from, to: position }
                }
            }
        };
        debug!(%id, %position, %timestamp, ?event, "agent update applied");
        Ok(event)
    }

    /// Change only the availability flag of an existing agent.
    ///
    /// The same ordering rule applies: a change stamped before the stored
    /// record is ignored.
    pub fn set_available(
        &mut self,
        id: AgentId,
        available: bool,
        timestamp: Timestamp,
    ) -> StoreResult<StoreEvent> {
        let agent = self.agents.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if timestamp < agent.last_update {
            debug!(%id, "ignoring out-of-order availability change");
            return Ok(StoreEvent::Ignored { id });
        }
        agent.available = available;
        agent.last_update = timestamp;
        Ok(StoreEvent::Refreshed { id })
    }

    /// Deregister `id`.  Returns `None` (not an error) if it was absent.
    pub fn remove(&mut self, id: AgentId) -> Option<StoreEvent> {
        let agent = self.agents.remove(&id)?;
        debug!(%id, "agent removed");
        Some(StoreEvent::Removed { id, position: agent.position })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn get(&self, id: AgentId) -> StoreResult<&Agent> {
        self.agents.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Iterator over every agent, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Lazy sequence of agents whose last update is fresh at `now`.
    ///
    /// The returned iterator is `Clone`; clone it before consuming to walk
    /// the same snapshot again.
    pub fn all_active(&self, now: Timestamp, staleness: Staleness) -> ActiveAgents<'_> {
        ActiveAgents { inner: self.agents.values(), now, staleness }
    }

    /// Ids of agents that are no longer fresh at `now`, ascending.
    pub fn stale_ids(&self, now: Timestamp, staleness: Staleness) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| !a.is_fresh(now, staleness))
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

// ── ActiveAgents ──────────────────────────────────────────────────────────────

/// Iterator returned by [`AgentStore::all_active`].
#[derive(Clone)]
pub struct ActiveAgents<'a> {
    inner: hash_map::Values<'a, AgentId, Agent>,
    now: Timestamp,
    staleness: Staleness,
}

impl<'a> Iterator for ActiveAgents<'a> {
    type Item = &'a Agent;

    fn next(&mut self) -> Option<&'a Agent> {
        let (now, staleness) = (self.now, self.staleness);
        self.inner.by_ref().find(|a| a.is_fresh(now, staleness))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
