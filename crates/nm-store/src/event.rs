//! The store's update stream.

use nm_core::{AgentId, GeoPoint};

/// Outcome of one store mutation.
///
/// Derived indexes only care about positions: `Inserted`, `Moved` and
/// `Removed` change them; `Refreshed` and `Ignored` do not.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// A new agent was registered.
    Inserted { id: AgentId, position: GeoPoint },
    /// An existing agent reported a different position.
    Moved { id: AgentId, from: GeoPoint, to: GeoPoint },
    /// Timestamp, availability or label changed; position did not.
    Refreshed { id: AgentId },
    /// The update was older than the stored record and was discarded.
    Ignored { id: AgentId },
    /// The agent was deregistered.
    Removed { id: AgentId, position: GeoPoint },
}

impl StoreEvent {
    pub fn id(&self) -> AgentId {
        match *self {
            StoreEvent::Inserted { id, .. }
            | StoreEvent::Moved { id, .. }
            | StoreEvent::Refreshed { id }
            | StoreEvent::Ignored { id }
            | StoreEvent::Removed { id, .. } => id,
        }
    }

    /// `true` if a positional index must be updated for this event.
    #[inline]
    pub fn changes_position(&self) -> bool {
        matches!(
            self,
            StoreEvent::Inserted { .. } | StoreEvent::Moved { .. } | StoreEvent::Removed { .. }
        )
    }

    #[inline]
    pub fn is_ignored(&self) -> bool {
        matches!(self, StoreEvent::Ignored { .. })
    }
}
