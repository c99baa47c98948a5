use std::collections::BTreeMap;

use super::time::DayIndex;

/// Rolling window of per-day counters.
///
/// # INVARIANT
/// Every retained day lies in `[today - retention + 1, today]`. Pruning is a
/// side effect of every read and write; there is no eviction callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCounterSeries {
    retention_days: u64,
    today: DayIndex,
    entries: BTreeMap<DayIndex, u64>,
}

impl DailyCounterSeries {
    pub fn new(retention_days: u64, today: DayIndex) -> Self {
        Self {
            retention_days: retention_days.max(1),
            today,
            entries: BTreeMap::new(),
        }
    }

    /// Rebuilds a series from persisted pairs. Days outside the window
    /// (stale, or later than `today`) and zero counts are discarded.
    pub fn from_entries(
        retention_days: u64,
        today: DayIndex,
        entries: impl IntoIterator<Item = (DayIndex, u64)>,
    ) -> Self {
        let mut series = Self::new(retention_days, today);
        let oldest = series.oldest_retained();
        for (day, count) in entries {
            if count == 0 || day < oldest || day > today {
                continue;
            }
            *series.entries.entry(day).or_insert(0) += count;
        }
        series
    }

    pub fn retention_days(&self) -> u64 {
        self.retention_days
    }

    pub fn today(&self) -> DayIndex {
        self.today
    }

    fn oldest_retained(&self) -> DayIndex {
        self.today.minus(self.retention_days - 1)
    }

    /// Moves the cursor to `day` (never backwards) and drops entries that
    /// fell out of the window.
    pub fn advance_and_prune(&mut self, day: DayIndex) {
        if day > self.today {
            self.today = day;
        }
        let oldest = self.oldest_retained();
        self.entries = self.entries.split_off(&oldest);
    }

    pub fn add_today(&mut self, n: u64) {
        self.advance_and_prune(self.today);
        *self.entries.entry(self.today).or_insert(0) += n;
    }

    pub fn total(&mut self) -> u64 {
        self.advance_and_prune(self.today);
        self.entries.values().sum()
    }

    /// Sum over the inclusive range `[first, last]`, clipped to the window.
    pub fn sum_between(&mut self, first: DayIndex, last: DayIndex) -> u64 {
        self.advance_and_prune(self.today);
        if first > last {
            return 0;
        }
        self.entries.range(first..=last).map(|(_, count)| count).sum()
    }

    /// Sum over the `days` most recent days, today included.
    pub fn trailing_sum(&mut self, days: u64) -> u64 {
        if days == 0 {
            return 0;
        }
        let first = self.today.minus(days - 1);
        self.sum_between(first, self.today)
    }

    pub fn entries(&self) -> impl Iterator<Item = (DayIndex, u64)> + '_ {
        self.entries.iter().map(|(day, count)| (*day, *count))
    }
}
