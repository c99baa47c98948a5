use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Whole days elapsed since the Unix epoch.
/// The key of every daily counter and the unit of every horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayIndex(pub u64);

impl DayIndex {
    pub fn from_time(now: SystemTime) -> Self {
        // A clock set before 1970 collapses onto day zero.
        let secs = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        DayIndex(secs / SECONDS_PER_DAY)
    }

    pub fn plus(self, days: u64) -> Self {
        DayIndex(self.0.saturating_add(days))
    }

    pub fn minus(self, days: u64) -> Self {
        DayIndex(self.0.saturating_sub(days))
    }

    /// Days from `earlier` to `self`, zero if `earlier` is later.
    pub fn days_since(self, earlier: DayIndex) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Wall-clock source. Monotonic for the engine's purposes.
pub trait Clock: Send {
    fn now(&self) -> SystemTime;

    fn today(&self) -> DayIndex {
        DayIndex::from_time(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Hand-driven clock. Clones share the same instant, so a host (or a test)
/// can keep one handle and advance the time the recorder observes.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        let millis = start
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Starts at midnight (UTC) of the given day.
    pub fn at_day(day: DayIndex) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(day.0 * SECONDS_PER_DAY))
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: u64) {
        self.advance(Duration::from_secs(days * SECONDS_PER_DAY));
    }

    pub fn set(&self, now: SystemTime) {
        let millis = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
