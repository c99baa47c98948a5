use tracing::debug;

use super::bucket::bucketize;
use super::counters::CounterSet;
use super::state::{AcquisitionFlags, MetricState, Profile};
use super::time::DayIndex;
use crate::config::EngineConfig;
use crate::telemetry::{MetricKind, MetricsSink};

/// Everything the engine knows, in memory. The store only mirrors it.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub config: EngineConfig,
    pub counters: CounterSet,
    pub states: [MetricState; 7],
    pub acquisition: AcquisitionFlags,
    pub profile: Profile,
}

impl Ledger {
    pub fn new(config: EngineConfig, today: DayIndex) -> Self {
        let counters = CounterSet::new(&config, today);
        Self {
            config,
            counters,
            states: Default::default(),
            acquisition: AcquisitionFlags::default(),
            profile: Profile::default(),
        }
    }

    pub fn state(&self, kind: MetricKind) -> &MetricState {
        &self.states[kind.index()]
    }

    pub fn state_mut(&mut self, kind: MetricKind) -> &mut MetricState {
        &mut self.states[kind.index()]
    }

    /// Marks a qualifying event for `kind` on `day`.
    pub fn activate(&mut self, kind: MetricKind, day: DayIndex) {
        let horizon = self.config.active_horizon_days;
        if self.state_mut(kind).activate(day, horizon) {
            debug!(metric = kind.histogram_name(), day = day.0, "metric active");
        }
    }

    /// Measures `kind` as of `day` and emits its bucket.
    ///
    /// With `scheduled == false` the metric's emission rule decides (event
    /// path); with `scheduled == true` the current bucket is always emitted
    /// (periodic path). Returns whether a sample went out.
    pub fn report(
        &mut self,
        kind: MetricKind,
        day: DayIndex,
        sink: &mut dyn MetricsSink,
        scheduled: bool,
    ) -> bool {
        let policy = kind.policy();
        if policy.gated && !self.profile.is_enabled() {
            return false;
        }

        let Some(value) = self
            .counters
            .measure(kind, &self.config, self.profile.enabled_on, day)
        else {
            return false;
        };
        if value == 0 && !policy.report_zero {
            return false;
        }

        let bucket = bucketize(kind, value);
        let state = self.state_mut(kind);
        if !scheduled && !state.should_emit(policy.emission, bucket) {
            return false;
        }

        sink.emit(kind.histogram_name(), bucket);
        state.mark_emitted(bucket);
        debug!(metric = kind.histogram_name(), bucket, scheduled, "emitted");
        true
    }

    /// Emits a fixed answer for a flag metric, bypassing the bucketizer.
    pub fn report_answer(&mut self, kind: MetricKind, answer: u8, sink: &mut dyn MetricsSink) {
        sink.emit(kind.histogram_name(), answer);
        self.state_mut(kind).mark_emitted(answer);
        debug!(metric = kind.histogram_name(), answer, "emitted");
    }
}
