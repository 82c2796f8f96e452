//! Agent feeds: where fleet positions come from.
//!
//! The service never reaches for a global data source.  The application
//! constructs a feed and passes it to [`Fleet::ingest`](crate::Fleet::ingest);
//! retries and reconnects stay the feed's business.
//!
//! # CSV format
//!
//! ```csv
//! agent_id,latitude,longitude,timestamp_ms,available,label
//! 1,30.10,31.20,0,true,Ahmed
//! 2,30.05,31.25,0,,Mona
//! 3,30.02,31.22,0
//! ```
//!
//! `available` and `label` may be empty or omitted entirely; an empty
//! `available` keeps the stored flag (new agents start available).

use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use nm_core::{AgentId, GeoPoint, Timestamp};
use nm_store::AgentUpdate;

use crate::FeedError;

/// A source of agent position reports.
pub trait AgentFeed {
    fn fetch(&self) -> Result<Vec<AgentUpdate>, FeedError>;
}

// ── StaticFeed ────────────────────────────────────────────────────────────────

/// A fixed, in-memory set of updates.
#[derive(Clone, Debug, Default)]
pub struct StaticFeed {
    updates: Vec<AgentUpdate>,
}

impl StaticFeed {
    pub fn new(updates: Vec<AgentUpdate>) -> Self {
        Self { updates }
    }
}

impl AgentFeed for StaticFeed {
    fn fetch(&self) -> Result<Vec<AgentUpdate>, FeedError> {
        Ok(self.updates.clone())
    }
}

// ── CsvAgentFeed ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AgentRecord {
    agent_id:     u64,
    latitude:     f64,
    longitude:    f64,
    timestamp_ms: i64,
    #[serde(default)]
    available:    Option<bool>,
    #[serde(default)]
    label:        Option<String>,
}

impl From<AgentRecord> for AgentUpdate {
    fn from(r: AgentRecord) -> AgentUpdate {
        AgentUpdate {
            id:        AgentId(r.agent_id),
            position:  GeoPoint::new(r.latitude, r.longitude),
            timestamp: Timestamp(r.timestamp_ms),
            available: r.available,
            label:     r.label.filter(|l| !l.is_empty()),
        }
    }
}

enum CsvSource {
    Path(PathBuf),
    Text(String),
}

/// Reads updates from a CSV file (re-read on every fetch) or an in-memory
/// CSV document.
pub struct CsvAgentFeed {
    source: CsvSource,
}

impl CsvAgentFeed {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { source: CsvSource::Path(path.into()) }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { source: CsvSource::Text(text.into()) }
    }
}

impl AgentFeed for CsvAgentFeed {
    fn fetch(&self) -> Result<Vec<AgentUpdate>, FeedError> {
        match &self.source {
            CsvSource::Path(path) => read_updates(std::fs::File::open(path)?),
            CsvSource::Text(text) => read_updates(text.as_bytes()),
        }
    }
}

/// Parse CSV update rows from any `Read` source.
///
/// Coordinates are *not* range-checked here; the store rejects them on
/// apply so a single bad row does not sink the whole batch.
pub fn read_updates<R: Read>(reader: R) -> Result<Vec<AgentUpdate>, FeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut updates = Vec::new();
    for row in csv_reader.deserialize::<AgentRecord>() {
        updates.push(row?.into());
    }
    Ok(updates)
}
