//! Agent records and the update tuple that mutates them.

use nm_core::{AgentId, GeoPoint, Staleness, Timestamp};

/// The store's record of one agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: GeoPoint,
    /// Timestamp of the newest update applied to this record.
    pub last_update: Timestamp,
    /// Whether the agent currently accepts matches.
    pub available: bool,
    /// Optional display name reported by the feed.
    pub label: Option<String>,
}

impl Agent {
    /// `true` if the last update is within `staleness` of `now`.
    #[inline]
    pub fn is_fresh(&self, now: Timestamp, staleness: Staleness) -> bool {
        staleness.is_fresh(self.last_update, now)
    }

    /// Fresh *and* available.
    #[inline]
    pub fn is_matchable(&self, now: Timestamp, staleness: Staleness) -> bool {
        self.available && self.is_fresh(now, staleness)
    }
}

/// One position report from the agent feed.
///
/// `available` and `label` are optional: `None` keeps the stored value (new
/// agents start available and unlabelled).
#[derive(Clone, Debug, PartialEq)]
pub struct AgentUpdate {
    pub id: AgentId,
    pub position: GeoPoint,
    pub timestamp: Timestamp,
    pub available: Option<bool>,
    pub label: Option<String>,
}

impl AgentUpdate {
    /// A bare position report.
    pub fn position(id: AgentId, position: GeoPoint, timestamp: Timestamp) -> Self {
        Self { id, position, timestamp, available: None, label: None }
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
