use serde::Serialize;
use tracing::{debug, info};

use super::counters::Counter;
use super::ledger::Ledger;
use super::persist;
use super::scheduler::ReportScheduler;
use super::state::ActivityStatus;
use super::time::{Clock, DayIndex};
use crate::config::EngineConfig;
use crate::prefs::PreferenceStore;
use crate::telemetry::{AcquisitionSource, MetricKind, MetricsSink, ANSWER_YES};

/// Public surface of the engine.
///
/// Every `record_*` call is synchronous: it replays any day boundaries the
/// clock crossed since the previous call, mutates the ledger, emits what the
/// metric policies allow and writes the touched keys back to the store.
///
/// # CONCURRENCY
/// Single owner. Hosts that share a recorder between tasks serialize access
/// with their own mutex.
pub struct EventRecorder {
    clock: Box<dyn Clock>,
    store: Box<dyn PreferenceStore>,
    sink: Box<dyn MetricsSink>,
    ledger: Ledger,
    scheduler: ReportScheduler,
}

/// Read-only view of one metric, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricStatus {
    pub kind: MetricKind,
    pub status: ActivityStatus,
    pub last_bucket: Option<u8>,
    pub active_until: Option<DayIndex>,
    pub fired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub today: DayIndex,
    pub enabled_on: Option<DayIndex>,
    pub metrics: Vec<MetricStatus>,
}

impl EngineStatus {
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricStatus> {
        self.metrics.iter().find(|m| m.kind == kind)
    }
}

impl EventRecorder {
    /// Loads prior state from `store` (once) and resumes the scheduler from
    /// the stored cursor. The first call on a day no earlier process covered
    /// runs that day's report; days that passed while no recorder was
    /// running are not replayed.
    pub fn new(
        config: EngineConfig,
        clock: impl Clock + 'static,
        store: impl PreferenceStore + 'static,
        sink: impl MetricsSink + 'static,
    ) -> Self {
        let today = clock.today();
        let ledger = persist::load_ledger(&store, config, today);
        let scheduler = ReportScheduler::resume(ledger.profile.last_report_day, today);
        info!(
            day = today.0,
            enabled = ledger.profile.is_enabled(),
            "engagement recorder started"
        );
        Self {
            clock: Box::new(clock),
            store: Box::new(store),
            sink: Box::new(sink),
            ledger,
            scheduler,
        }
    }

    /// Runs the day-boundary catch-up. Returns the day events are booked on,
    /// which never moves backwards even if the clock does.
    fn begin(&mut self) -> DayIndex {
        let today = self.clock.today();
        let unseen: Vec<DayIndex> = self.scheduler.take_unseen_days(today).collect();
        for day in unseen {
            let touched = self.scheduler.run_day(day, &mut self.ledger, self.sink.as_mut());
            for kind in touched {
                persist::save_metric(self.store.as_mut(), &self.ledger, kind);
            }
        }

        let last_seen = self.scheduler.last_seen();
        if self.ledger.profile.last_report_day != Some(last_seen) {
            self.ledger.profile.last_report_day = Some(last_seen);
            persist::save_profile(self.store.as_mut(), &self.ledger);
        }
        last_seen
    }

    /// Periodic entry point. The host calls it at least once per day; calling
    /// it more often is harmless.
    pub fn tick(&mut self) {
        self.begin();
    }

    pub fn record_enabled(&mut self, is_enabled: bool) {
        let today = self.begin();
        if !is_enabled {
            return;
        }

        // 1. One-shot answers
        if !self.ledger.state(MetricKind::Enabled).fired {
            self.ledger
                .report_answer(MetricKind::Enabled, ANSWER_YES, self.sink.as_mut());
            persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::Enabled);
        }

        if !self.ledger.acquisition.recorded {
            let source = if self.ledger.acquisition.omnibox_opened_before_enable {
                AcquisitionSource::Omnibox
            } else {
                AcquisitionSource::Sidebar
            };
            self.ledger.report_answer(
                MetricKind::AcquisitionSource,
                source.answer(),
                self.sink.as_mut(),
            );
            self.ledger.acquisition.recorded = true;
            persist::save_acquisition(self.store.as_mut(), &self.ledger);
            persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::AcquisitionSource);
        }

        // 2. Gate opening
        if self.ledger.profile.is_enabled() {
            return;
        }
        self.ledger.profile.enabled_on = Some(today);
        persist::save_profile(self.store.as_mut(), &self.ledger);
        info!(day = today.0, "feature enabled, omnibox metrics gate open");

        self.ledger.activate(MetricKind::OmniboxOpens, today);
        self.ledger.activate(MetricKind::OmniboxWeekCompare, today);
        self.ledger
            .report(MetricKind::OmniboxOpens, today, self.sink.as_mut(), false);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::OmniboxOpens);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::OmniboxWeekCompare);
    }

    pub fn record_new_chat(&mut self) {
        let today = self.begin();
        self.ledger.counters.add(Counter::Chats, today, 1);
        persist::save_counter(self.store.as_mut(), &self.ledger, Counter::Chats);

        self.ledger.activate(MetricKind::ChatCount, today);
        self.ledger
            .report(MetricKind::ChatCount, today, self.sink.as_mut(), false);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::ChatCount);
    }

    pub fn record_new_prompt(&mut self) {
        let today = self.begin();
        self.ledger.counters.add(Counter::Prompts, today, 1);
        persist::save_counter(self.store.as_mut(), &self.ledger, Counter::Prompts);

        self.ledger.activate(MetricKind::AvgPromptsPerChat, today);
        self.ledger
            .report(MetricKind::AvgPromptsPerChat, today, self.sink.as_mut(), false);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::AvgPromptsPerChat);

        // At most one "used" answer per day.
        if self.ledger.profile.last_usage_day != Some(today) {
            self.ledger
                .report_answer(MetricKind::UsageDaily, ANSWER_YES, self.sink.as_mut());
            self.ledger.profile.last_usage_day = Some(today);
            persist::save_profile(self.store.as_mut(), &self.ledger);
            persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::UsageDaily);
        }
    }

    pub fn record_omnibox_open(&mut self) {
        let today = self.begin();

        if !self.ledger.profile.is_enabled() {
            // Not counted, but remembered for attribution.
            if !self.ledger.acquisition.omnibox_opened_before_enable {
                self.ledger.acquisition.omnibox_opened_before_enable = true;
                persist::save_acquisition(self.store.as_mut(), &self.ledger);
            }
            debug!("omnibox open before first enable, not counted");
            return;
        }

        self.ledger.counters.add(Counter::OmniboxOpens, today, 1);
        persist::save_counter(self.store.as_mut(), &self.ledger, Counter::OmniboxOpens);

        self.ledger.activate(MetricKind::OmniboxOpens, today);
        self.ledger.activate(MetricKind::OmniboxWeekCompare, today);
        self.ledger
            .report(MetricKind::OmniboxOpens, today, self.sink.as_mut(), false);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::OmniboxOpens);
        persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::OmniboxWeekCompare);
    }

    /// Counted regardless of the gate; it is the denominator of the open
    /// rate. Never emits on its own.
    pub fn record_omnibox_search_query(&mut self) {
        let today = self.begin();
        self.ledger.counters.add(Counter::OmniboxQueries, today, 1);
        persist::save_counter(self.store.as_mut(), &self.ledger, Counter::OmniboxQueries);

        if self.ledger.profile.is_enabled() {
            self.ledger.activate(MetricKind::OmniboxWeekCompare, today);
            persist::save_metric(self.store.as_mut(), &self.ledger, MetricKind::OmniboxWeekCompare);
        }
    }

    /// The sidebar became the latest surface the user opened the assistant
    /// from. Only matters for attribution before the first enable.
    pub fn handle_open_via_sidebar(&mut self) {
        self.begin();
        if !self.ledger.profile.is_enabled() && self.ledger.acquisition.omnibox_opened_before_enable {
            self.ledger.acquisition.omnibox_opened_before_enable = false;
            persist::save_acquisition(self.store.as_mut(), &self.ledger);
        }
    }

    /// Snapshot of every metric as of the clock's current day. Does not run
    /// the catch-up and never emits.
    pub fn status(&self) -> EngineStatus {
        let today = self.clock.today();
        let metrics = MetricKind::ALL
            .iter()
            .map(|&kind| {
                let state = self.ledger.state(kind);
                MetricStatus {
                    kind,
                    status: state.status(today),
                    last_bucket: state.last_bucket,
                    active_until: state.active_until,
                    fired: state.fired,
                }
            })
            .collect();
        EngineStatus {
            today,
            enabled_on: self.ledger.profile.enabled_on,
            metrics,
        }
    }
}
