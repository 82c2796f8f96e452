//! `MatchRequestHandler`: answers "who is the nearest driver to me?".
//!
//! A request validates the rider position, reads the current time from the
//! injected [`Clock`], and runs one query against a consistent [`Fleet`]
//! snapshot.  The predicate handed to the spatial index combines the
//! caller's [`MatchFilters`] with the configured staleness window.  Requests
//! never mutate the fleet, so dropping one mid-flight needs no cleanup.

use std::sync::Arc;

use tracing::debug;

use nm_core::{AgentId, Clock, DistanceUnit, GeoPoint, Staleness, Timestamp};
use nm_spatial::Hit;
use nm_store::{Agent, AgentStore};

use crate::{Fleet, MatchConfig, MatchError};

// ── Query types ───────────────────────────────────────────────────────────────

/// Per-request candidate filters.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchFilters {
    /// Skip agents whose availability flag is off.
    pub require_available: bool,
    /// Skip agents farther than this from the rider.
    pub max_distance_km: Option<f64>,
    /// Skip these agents (e.g. drivers who already declined this ride).
    pub exclude: Vec<AgentId>,
}

impl Default for MatchFilters {
    fn default() -> Self {
        Self { require_available: true, max_distance_km: None, exclude: Vec::new() }
    }
}

impl MatchFilters {
    /// Also consider agents that are flagged unavailable.
    pub fn any_availability(mut self) -> Self {
        self.require_available = false;
        self
    }

    pub fn within_km(mut self, km: f64) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = AgentId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    /// Whether `agent` passes these filters plus the freshness check.
    /// Distance is checked separately against the index result.
    pub fn accepts(&self, agent: &Agent, now: Timestamp, staleness: Staleness) -> bool {
        (!self.require_available || agent.available)
            && agent.is_fresh(now, staleness)
            && !self.exclude.contains(&agent.id)
    }

    /// Rejects a negative, infinite or NaN `max_distance_km`.
    pub fn validate(&self) -> Result<(), MatchError> {
        match self.max_distance_km {
            Some(km) => check_radius(km),
            None => Ok(()),
        }
    }

    fn within_range(&self, distance_km: f64) -> bool {
        self.max_distance_km.is_none_or(|max| distance_km <= max)
    }
}

fn check_radius(km: f64) -> Result<(), MatchError> {
    if km.is_finite() && km >= 0.0 {
        Ok(())
    } else {
        Err(MatchError::InvalidRadius(km))
    }
}

/// A rider's request.  Built per call and discarded afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchQuery {
    pub rider: GeoPoint,
    pub filters: MatchFilters,
}

impl MatchQuery {
    pub fn new(rider: GeoPoint, filters: MatchFilters) -> Self {
        Self { rider, filters }
    }
}

/// The selected agent.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub agent: AgentId,
    pub label: Option<String>,
    pub position: GeoPoint,
    /// Haversine distance from the rider, in kilometres.
    pub distance_km: f64,
    /// Clock reading at which the request was evaluated.
    pub matched_at: Timestamp,
}

impl MatchResult {
    /// Distance expressed in `unit`.
    pub fn distance(&self, unit: DistanceUnit) -> f64 {
        unit.from_km(self.distance_km)
    }
}

// ── Handler ───────────────────────────────────────────────────────────────────

pub struct MatchRequestHandler {
    fleet: Arc<Fleet>,
    clock: Arc<dyn Clock>,
    staleness: Staleness,
    defaults: MatchFilters,
    unit: DistanceUnit,
}

impl MatchRequestHandler {
    pub fn new(fleet: Arc<Fleet>, clock: Arc<dyn Clock>, config: &MatchConfig) -> Self {
        Self {
            fleet,
            clock,
            staleness: config.staleness(),
            defaults: config.default_filters(),
            unit: config.distance_unit,
        }
    }

    pub fn staleness(&self) -> Staleness {
        self.staleness
    }

    /// Filters from the configuration, for callers without their own.
    pub fn default_filters(&self) -> &MatchFilters {
        &self.defaults
    }

    /// Configured presentation unit; see [`MatchResult::distance`].
    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    /// Nearest fresh agent to `rider` that passes `filters`.
    ///
    /// # Errors
    ///
    /// - [`MatchError::InvalidPosition`] for out-of-range rider coordinates.
    /// - [`MatchError::InvalidRadius`] for a bad `filters.max_distance_km`.
    /// - [`MatchError::NoAvailableAgent`] when nobody qualifies.
    pub fn match_rider(&self, rider: GeoPoint, filters: &MatchFilters) -> Result<MatchResult, MatchError> {
        rider.validate()?;
        filters.validate()?;
        let now = self.clock.now();
        let staleness = self.staleness;

        let found = self.fleet.read(|store, index| {
            index
                .nearest(rider, |id| Self::admits(store, id, filters, now, staleness))
                .ok()
                .filter(|hit| filters.within_range(hit.distance_km))
                .map(|hit| Self::to_result(store, hit, now))
        });

        match found {
            Some(m) => {
                debug!(%rider, agent = %m.agent, distance_km = m.distance_km, "rider matched");
                Ok(m)
            }
            None => {
                debug!(%rider, %now, %staleness, "no available agent");
                Err(MatchError::NoAvailableAgent)
            }
        }
    }

    pub fn match_query(&self, query: &MatchQuery) -> Result<MatchResult, MatchError> {
        self.match_rider(query.rider, &query.filters)
    }

    /// [`match_rider`](Self::match_rider) with the configured default filters.
    pub fn match_default(&self, rider: GeoPoint) -> Result<MatchResult, MatchError> {
        self.match_rider(rider, &self.defaults)
    }

    /// Up to `k` qualifying agents, nearest first.  Empty if none qualify.
    pub fn candidates(&self, query: &MatchQuery, k: usize) -> Result<Vec<MatchResult>, MatchError> {
        query.rider.validate()?;
        query.filters.validate()?;
        let now = self.clock.now();
        let staleness = self.staleness;
        let filters = &query.filters;

        Ok(self.fleet.read(|store, index| {
            index
                .k_nearest(query.rider, k, |id| Self::admits(store, id, filters, now, staleness))
                .into_iter()
                .take_while(|hit| filters.within_range(hit.distance_km))
                .map(|hit| Self::to_result(store, hit, now))
                .collect()
        }))
    }

    /// Every qualifying agent within `radius_km` of `rider`, nearest first.
    ///
    /// A tighter `filters.max_distance_km` still applies.  A negative or
    /// non-finite radius is [`MatchError::InvalidRadius`].
    pub fn nearby(
        &self,
        rider: GeoPoint,
        radius_km: f64,
        filters: &MatchFilters,
    ) -> Result<Vec<MatchResult>, MatchError> {
        rider.validate()?;
        check_radius(radius_km)?;
        filters.validate()?;
        let now = self.clock.now();
        let staleness = self.staleness;
        let radius = filters.max_distance_km.map_or(radius_km, |max| max.min(radius_km));

        Ok(self.fleet.read(|store, index| {
            index
                .within_radius(rider, radius, |id| Self::admits(store, id, filters, now, staleness))
                .into_iter()
                .map(|hit| Self::to_result(store, hit, now))
                .collect()
        }))
    }

    fn admits(
        store: &AgentStore,
        id: AgentId,
        filters: &MatchFilters,
        now: Timestamp,
        staleness: Staleness,
    ) -> bool {
        store.get(id).is_ok_and(|agent| filters.accepts(agent, now, staleness))
    }

    fn to_result(store: &AgentStore, hit: Hit, now: Timestamp) -> MatchResult {
        MatchResult {
            agent: hit.id,
            label: store.get(hit.id).ok().and_then(|a| a.label.clone()),
            position: hit.position,
            distance_km: hit.distance_km,
            matched_at: now,
        }
    }
}
