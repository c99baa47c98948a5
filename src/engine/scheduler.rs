use tracing::info;

use super::ledger::Ledger;
use super::state::{ActivityStatus, Cadence, POLICIES};
use super::time::DayIndex;
use crate::telemetry::{MetricKind, MetricsSink};

/// Lazy day-boundary detector.
///
/// Holds no timer. Every public entry point of the recorder (and the host's
/// `tick`) asks for the days crossed since the previous check and replays
/// them in order, so a clock that jumps four days produces four daily
/// reports.
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    last_seen: DayIndex,
}

impl ReportScheduler {
    pub fn new(today: DayIndex) -> Self {
        Self { last_seen: today }
    }

    /// Picks up after a restart. A day later than the stored cursor gets
    /// its daily report; the days in between were offline and are skipped.
    /// A stored cursor ahead of the clock is kept, so nothing rewinds.
    pub fn resume(stored: Option<DayIndex>, today: DayIndex) -> Self {
        let last_seen = match stored {
            Some(day) if day >= today => day,
            Some(_) => today.minus(1),
            None => today,
        };
        Self { last_seen }
    }

    pub fn last_seen(&self) -> DayIndex {
        self.last_seen
    }

    /// Days in `(last_seen, today]`, oldest first. A clock that went
    /// backwards yields nothing and does not rewind the scheduler.
    pub fn take_unseen_days(&mut self, today: DayIndex) -> impl Iterator<Item = DayIndex> {
        let first = self.last_seen.0 + 1;
        let last = today.0;
        if today > self.last_seen {
            self.last_seen = today;
        }
        (first..=last).map(DayIndex)
    }

    /// `day` closes a compare period counted from `anchor`.
    pub fn is_period_boundary(day: DayIndex, anchor: DayIndex, period_days: u64) -> bool {
        period_days > 0 && day > anchor && day.days_since(anchor) % period_days == 0
    }

    /// Daily report for one day: expire, then re-emit every active periodic
    /// metric. Returns the metrics whose state changed and must be persisted.
    pub fn run_day(&self, day: DayIndex, ledger: &mut Ledger, sink: &mut dyn MetricsSink) -> Vec<MetricKind> {
        let mut touched = Vec::new();
        ledger.counters.advance_all(day);

        for policy in POLICIES.iter().filter(|p| p.cadence != Cadence::None) {
            let kind = policy.kind;

            // 1. Active -> Dormant
            if ledger.state_mut(kind).expire(day) {
                info!(metric = kind.histogram_name(), day = day.0, "metric dormant");
                touched.push(kind);
                continue;
            }
            if ledger.state(kind).status(day) == ActivityStatus::Dormant {
                continue;
            }

            // 2. Cadence
            if policy.cadence == Cadence::EveryPeriod {
                let Some(anchor) = ledger.profile.enabled_on else {
                    continue;
                };
                if !Self::is_period_boundary(day, anchor, ledger.config.compare_period_days) {
                    continue;
                }
            }

            // 3. Re-emit
            if ledger.report(kind, day, sink, true) {
                touched.push(kind);
            }
        }

        touched
    }
}
