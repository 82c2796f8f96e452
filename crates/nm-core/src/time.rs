//! Time model: update timestamps, the staleness policy and injectable clocks.
//!
//! # Design
//!
//! Time is an integer count of milliseconds since the Unix epoch.  Integer
//! time keeps ordering comparisons between updates exact, which the store
//! relies on to discard out-of-order updates.
//!
//! The current time is never read from a process-wide source inside the
//! matching core.  Callers inject a [`Clock`]; production code uses
//! [`SystemClock`], tests use [`ManualClock`] to step time deterministically.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ── Timestamp ────────────────────────────────────────────────────────────────

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_millis(ms: i64) -> Timestamp {
        Timestamp(ms)
    }

    #[inline]
    pub fn from_secs(secs: i64) -> Timestamp {
        Timestamp(secs.saturating_mul(1_000))
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Return the timestamp `d` after `self`, saturating at `i64::MAX`.
    #[inline]
    pub fn saturating_add(self, d: Duration) -> Timestamp {
        let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed from `earlier` to `self`.  Negative if `earlier`
    /// lies in the future.
    #[inline]
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms", self.0)
    }
}

// ── Staleness ─────────────────────────────────────────────────────────────────

/// Maximum age of a position update before its agent stops being matchable.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Staleness {
    /// Every agent stays matchable regardless of age.
    #[default]
    Unbounded,
    /// Agents whose last update is older than the window are excluded.
    Window(Duration),
}

impl Staleness {
    pub fn from_secs(secs: u64) -> Staleness {
        Staleness::Window(Duration::from_secs(secs))
    }

    /// `true` if an update at `last_update` is still fresh at `now`, i.e.
    /// `now - last_update <= window`.
    ///
    /// Updates stamped later than `now` (clock skew between feed and service)
    /// are always fresh.
    #[inline]
    pub fn is_fresh(self, last_update: Timestamp, now: Timestamp) -> bool {
        match self {
            Staleness::Unbounded => true,
            Staleness::Window(window) => {
                let age = now.millis_since(last_update);
                age <= 0 || (age as u128) <= window.as_millis()
            }
        }
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Unbounded => f.write_str("unbounded"),
            Staleness::Window(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}

// ── Clocks ────────────────────────────────────────────────────────────────────

/// Source of "now" for staleness checks and match timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from [`SystemTime`].
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A system clock set before 1970 reads as negative time.
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp(i64::try_from(d.as_millis()).unwrap_or(i64::MAX)),
            Err(e) => Timestamp(-i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

/// A clock that only moves when told to.  Safe to share across threads.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now_ms: AtomicI64::new(start.0) }
    }

    pub fn set(&self, t: Timestamp) {
        self.now_ms.store(t.0, Ordering::SeqCst);
    }

    pub fn advance(&self, d: Duration) {
        let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::SeqCst))
    }
}
