use super::bucket::ceil_ratio;
use super::series::DailyCounterSeries;
use super::time::DayIndex;
use crate::config::EngineConfig;
use crate::telemetry::MetricKind;

/// Raw event counters. Several metrics read the same counter, so counts live
/// here once instead of inside each metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Chats,
    Prompts,
    OmniboxOpens,
    OmniboxQueries,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::Chats,
        Counter::Prompts,
        Counter::OmniboxOpens,
        Counter::OmniboxQueries,
    ];

    pub fn storage_name(self) -> &'static str {
        match self {
            Counter::Chats => "chats",
            Counter::Prompts => "prompts",
            Counter::OmniboxOpens => "omnibox_opens",
            Counter::OmniboxQueries => "omnibox_queries",
        }
    }

    pub fn retention_days(self, config: &EngineConfig) -> u64 {
        match self {
            Counter::Chats | Counter::Prompts => config.report_window_days,
            Counter::OmniboxOpens | Counter::OmniboxQueries => config.omnibox_retention_days(),
        }
    }
}

/// Scale of the open rate compared week over week.
const PER_MILLE: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSet {
    series: [DailyCounterSeries; 4],
}

impl CounterSet {
    pub fn new(config: &EngineConfig, today: DayIndex) -> Self {
        Self {
            series: Counter::ALL.map(|c| DailyCounterSeries::new(c.retention_days(config), today)),
        }
    }

    pub fn series(&self, counter: Counter) -> &DailyCounterSeries {
        &self.series[counter as usize]
    }

    pub fn series_mut(&mut self, counter: Counter) -> &mut DailyCounterSeries {
        &mut self.series[counter as usize]
    }

    pub fn replace(&mut self, counter: Counter, series: DailyCounterSeries) {
        self.series[counter as usize] = series;
    }

    pub fn advance_all(&mut self, day: DayIndex) {
        for series in self.series.iter_mut() {
            series.advance_and_prune(day);
        }
    }

    pub fn add(&mut self, counter: Counter, day: DayIndex, n: u64) {
        let series = self.series_mut(counter);
        series.advance_and_prune(day);
        series.add_today(n);
    }

    fn trailing(&mut self, counter: Counter, day: DayIndex, days: u64) -> u64 {
        let series = self.series_mut(counter);
        series.advance_and_prune(day);
        series.trailing_sum(days)
    }

    fn between(&mut self, counter: Counter, day: DayIndex, first: DayIndex, last: DayIndex) -> u64 {
        let series = self.series_mut(counter);
        series.advance_and_prune(day);
        series.sum_between(first, last)
    }

    /// Raw value of `kind` as of `day`, before bucketing. `None` means the
    /// metric has nothing to measure yet (no chats, no closed period, or a
    /// flag metric).
    pub fn measure(
        &mut self,
        kind: MetricKind,
        config: &EngineConfig,
        enabled_on: Option<DayIndex>,
        day: DayIndex,
    ) -> Option<u64> {
        let window = config.report_window_days;
        match kind {
            MetricKind::ChatCount => Some(self.trailing(Counter::Chats, day, window)),
            MetricKind::AvgPromptsPerChat => {
                let chats = self.trailing(Counter::Chats, day, window);
                let prompts = self.trailing(Counter::Prompts, day, window);
                ceil_ratio(prompts, chats)
            }
            MetricKind::OmniboxOpens => Some(self.trailing(Counter::OmniboxOpens, day, window)),
            MetricKind::OmniboxWeekCompare => self.week_growth(config, enabled_on?, day),
            MetricKind::Enabled | MetricKind::AcquisitionSource | MetricKind::UsageDaily => None,
        }
    }

    /// Growth of the open rate of the period just closed over the one before.
    ///
    /// Closed period: `[day - p, day - 1]`. Previous: `[day - 2p, day - p - 1]`.
    /// A previous period that starts before the first enable is not a
    /// baseline; such comparisons report zero growth.
    fn week_growth(&mut self, config: &EngineConfig, enabled_on: DayIndex, day: DayIndex) -> Option<u64> {
        let period = config.compare_period_days;
        if day < enabled_on.plus(period) {
            return None;
        }

        let closed_first = day.minus(period);
        let closed_last = day.minus(1);
        let current = self.open_rate(day, closed_first, closed_last);

        let span = period.saturating_mul(2);
        let has_baseline = day.0 >= span && day.minus(span) >= enabled_on;
        if !has_baseline {
            return Some(0);
        }

        let previous = self.open_rate(day, day.minus(span), day.minus(period.saturating_add(1)));
        Some(current.saturating_sub(previous))
    }

    fn open_rate(&mut self, day: DayIndex, first: DayIndex, last: DayIndex) -> u64 {
        let opens = self.between(Counter::OmniboxOpens, day, first, last);
        let queries = self.between(Counter::OmniboxQueries, day, first, last);
        opens * PER_MILLE / queries.max(1)
    }
}
