//! Strongly typed agent identifier.
//!
//! `AgentId` is `Copy + Ord + Hash` so it can be used as a map key and as the
//! deterministic tie-break key without ceremony.  The ordering of the inner
//! integer *is* the tie-break order: on equal distance the lower id wins.

use std::fmt;

/// Stable, unique identifier of an agent (driver).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AgentId(pub u64);

impl AgentId {
    #[inline(always)]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl From<u64> for AgentId {
    #[inline(always)]
    fn from(n: u64) -> AgentId {
        AgentId(n)
    }
}
