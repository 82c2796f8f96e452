//! Great-circle nearest-neighbour index over agent positions.
//!
//! # Data layout
//!
//! Each agent is stored in an R*-tree (via `rstar`) as its position projected
//! onto the unit sphere, `[x, y, z]`.  Euclidean (chord) distance between two
//! such vectors is `2·sin(θ/2)` for great-circle angle `θ`, which is strictly
//! increasing on `[0, π]`.  Nearest-by-chord is therefore nearest-by-haversine
//! everywhere on the globe; there is no lat/lon flattening to break down near
//! the poles or across the antimeridian.
//!
//! A side map `AgentId → GeoPoint` locates an agent's current tree entry so
//! an update can remove it before inserting the new one.  Updates are always
//! delete + insert: a moved agent may belong in a different subtree.
//!
//! # Ranking
//!
//! Results are ordered by `(haversine distance, AgentId)`; equal distances
//! resolve to the lower id.  The tree walk collects every candidate whose
//! chord distance is within [`TIE_BAND_D2`] of the cut-off before ranking,
//! so floating-point disagreement between the chord and haversine formulas
//! cannot reorder near-equidistant agents.
//!
//! # Complexity
//!
//! Insert/remove: O(log n).  `nearest` / `k_nearest`: O(log n + k) when the
//! predicate accepts most agents; each rejected agent costs one extra step
//! of the incremental nearest-neighbour walk.

use std::cmp::Ordering;
use std::f64::consts::PI;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use nm_core::{AgentId, GeoPoint, EARTH_RADIUS_KM};
use nm_store::{AgentStore, StoreEvent};

use crate::{SpatialError, SpatialResult};

/// Squared-chord slack applied when cutting off the nearest-neighbour walk.
/// Corresponds to well under a millimetre of ground distance.
const TIE_BAND_D2: f64 = 1e-12;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct AgentEntry {
    point: [f64; 3],
    position: GeoPoint,
    id: AgentId,
}

impl AgentEntry {
    fn new(id: AgentId, position: GeoPoint) -> Self {
        Self { point: position.to_unit_vector(), position, id }
    }
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    /// Squared chord length on the unit sphere.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── Hit ───────────────────────────────────────────────────────────────────────

/// One query result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub id: AgentId,
    pub position: GeoPoint,
    /// Haversine distance from the query point, in kilometres.
    pub distance_km: f64,
}

impl Hit {
    /// Result order: nearer first, then lower id.
    pub fn rank_cmp(&self, other: &Hit) -> Ordering {
        self.distance_km
            .total_cmp(&other.distance_km)
            .then(self.id.cmp(&other.id))
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<AgentEntry>,
    positions: FxHashMap<AgentId, GeoPoint>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load from `(id, position)` pairs.  O(n log n), faster than n
    /// inserts.  Later pairs win on duplicate ids.
    pub fn bulk_load<I>(agents: I) -> Self
    where
        I: IntoIterator<Item = (AgentId, GeoPoint)>,
    {
        let mut positions = FxHashMap::default();
        for (id, pos) in agents {
            positions.insert(id, pos);
        }
        let entries: Vec<AgentEntry> = positions
            .iter()
            .map(|(&id, &pos)| AgentEntry::new(id, pos))
            .collect();
        Self { tree: RTree::bulk_load(entries), positions }
    }

    /// Build an index mirroring every agent currently in `store`.
    pub fn from_store(store: &AgentStore) -> Self {
        Self::bulk_load(store.iter().map(|a| (a.id, a.position)))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn position_of(&self, id: AgentId) -> Option<GeoPoint> {
        self.positions.get(&id).copied()
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Place `id` at `position`, replacing any previous entry.
    pub fn upsert(&mut self, id: AgentId, position: GeoPoint) {
        if self.positions.get(&id) == Some(&position) {
            return;
        }
        self.remove(id);
        self.tree.insert(AgentEntry::new(id, position));
        self.positions.insert(id, position);
    }

    /// Drop `id` from the index.  Returns `false` if it was not indexed.
    pub fn remove(&mut self, id: AgentId) -> bool {
        let Some(old) = self.positions.remove(&id) else {
            return false;
        };
        let removed = self.tree.remove(&AgentEntry::new(id, old));
        debug_assert!(removed.is_some(), "side map and tree out of sync for {id}");
        true
    }

    /// Apply one event from the store's update stream.
    pub fn apply(&mut self, event: &StoreEvent) {
        match *event {
            StoreEvent::Inserted { id, position } => self.upsert(id, position),
            StoreEvent::Moved { id, to, .. } => self.upsert(id, to),
            StoreEvent::Removed { id, .. } => {
                self.remove(id);
            }
            StoreEvent::Refreshed { .. } | StoreEvent::Ignored { .. } => {}
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The agent nearest to `position` among those accepted by `predicate`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyIndex`] if no indexed agent satisfies `predicate`.
    pub fn nearest<F>(&self, position: GeoPoint, predicate: F) -> SpatialResult<Hit>
    where
        F: FnMut(AgentId) -> bool,
    {
        self.ranked(position, 1, predicate)
            .into_iter()
            .next()
            .ok_or(SpatialError::EmptyIndex)
    }

    /// Up to `k` accepted agents nearest to `position`, ranked.
    pub fn k_nearest<F>(&self, position: GeoPoint, k: usize, predicate: F) -> Vec<Hit>
    where
        F: FnMut(AgentId) -> bool,
    {
        self.ranked(position, k, predicate)
    }

    /// Every accepted agent within `radius_km` of `position`, ranked.
    pub fn within_radius<F>(&self, position: GeoPoint, radius_km: f64, mut predicate: F) -> Vec<Hit>
    where
        F: FnMut(AgentId) -> bool,
    {
        if radius_km.is_nan() || radius_km < 0.0 {
            return Vec::new();
        }
        let query = position.to_unit_vector();
        let max_d2 = chord_2_for_km(radius_km) + TIE_BAND_D2;
        let mut hits: Vec<Hit> = self
            .tree
            .nearest_neighbor_iter(&query)
            .take_while(|e| e.distance_2(&query) <= max_d2)
            .filter(|e| predicate(e.id))
            .map(|e| hit(e, position))
            .filter(|h| h.distance_km <= radius_km)
            .collect();
        hits.sort_by(Hit::rank_cmp);
        hits
    }

    /// Iterator over `(id, position)` of every indexed agent.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, GeoPoint)> + '_ {
        self.positions.iter().map(|(&id, &pos)| (id, pos))
    }

    fn ranked<F>(&self, position: GeoPoint, k: usize, mut predicate: F) -> Vec<Hit>
    where
        F: FnMut(AgentId) -> bool,
    {
        if k == 0 {
            return Vec::new();
        }
        let query = position.to_unit_vector();
        let mut hits: Vec<Hit> = Vec::with_capacity(k);
        let mut cutoff: Option<f64> = None;

        for entry in self.tree.nearest_neighbor_iter(&query) {
            let d2 = entry.distance_2(&query);
            if cutoff.is_some_and(|c| d2 > c) {
                break;
            }
            if !predicate(entry.id) {
                continue;
            }
            hits.push(hit(entry, position));
            if cutoff.is_none() && hits.len() == k {
                cutoff = Some(d2 + TIE_BAND_D2);
            }
        }

        hits.sort_by(Hit::rank_cmp);
        hits.truncate(k);
        hits
    }
}

#[inline]
fn hit(entry: &AgentEntry, query: GeoPoint) -> Hit {
    Hit {
        id: entry.id,
        position: entry.position,
        distance_km: query.distance_km(entry.position),
    }
}

/// Squared unit-sphere chord spanning `km` of great-circle distance.
fn chord_2_for_km(km: f64) -> f64 {
    let theta = (km / EARTH_RADIUS_KM).min(PI);
    let chord = 2.0 * (theta * 0.5).sin();
    chord * chord
}
