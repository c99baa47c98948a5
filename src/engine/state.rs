use serde::{Deserialize, Serialize};

use super::time::DayIndex;
use crate::telemetry::MetricKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    /// No qualifying event inside the horizon. Nothing is re-emitted.
    Dormant,
    /// Re-emitted by the scheduler once per day (or per period).
    Active,
}

/// When an event-triggered measurement turns into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// First time only, ever.
    Once,
    /// Only when the bucket differs from the last one emitted.
    OnChange,
    /// Every qualifying event.
    EveryEvent,
    /// Events never emit; only the scheduler does.
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Not revisited by the scheduler.
    None,
    Daily,
    /// Every `compare_period_days`, counted from the first enable.
    EveryPeriod,
}

/// Declarative per-metric policy. The engine has no per-metric branches
/// beyond this table and the value definitions in `counters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPolicy {
    pub kind: MetricKind,
    pub emission: Emission,
    pub cadence: Cadence,
    /// Requires the feature to have been enabled at least once.
    pub gated: bool,
    /// Whether a zero value is a reportable answer or means "nothing to say".
    pub report_zero: bool,
}

pub const POLICIES: [MetricPolicy; 7] = [
    MetricPolicy {
        kind: MetricKind::Enabled,
        emission: Emission::Once,
        cadence: Cadence::None,
        gated: false,
        report_zero: true,
    },
    MetricPolicy {
        kind: MetricKind::AcquisitionSource,
        emission: Emission::Once,
        cadence: Cadence::None,
        gated: false,
        report_zero: true,
    },
    MetricPolicy {
        kind: MetricKind::ChatCount,
        emission: Emission::OnChange,
        cadence: Cadence::Daily,
        gated: false,
        report_zero: false,
    },
    MetricPolicy {
        kind: MetricKind::AvgPromptsPerChat,
        emission: Emission::OnChange,
        cadence: Cadence::Daily,
        gated: false,
        report_zero: false,
    },
    MetricPolicy {
        kind: MetricKind::UsageDaily,
        emission: Emission::EveryEvent,
        cadence: Cadence::None,
        gated: false,
        report_zero: true,
    },
    MetricPolicy {
        kind: MetricKind::OmniboxOpens,
        emission: Emission::EveryEvent,
        cadence: Cadence::Daily,
        gated: true,
        report_zero: true,
    },
    MetricPolicy {
        kind: MetricKind::OmniboxWeekCompare,
        emission: Emission::Scheduled,
        cadence: Cadence::EveryPeriod,
        gated: true,
        report_zero: true,
    },
];

impl MetricKind {
    /// Position in `POLICIES` and in every per-metric array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn policy(self) -> MetricPolicy {
        POLICIES[self.index()]
    }
}

/// Mutable per-metric state. Owned by the recorder, persisted per metric.
///
/// `active_until == None` is the Dormant state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricState {
    pub last_bucket: Option<u8>,
    pub active_until: Option<DayIndex>,
    pub fired: bool,
}

impl MetricState {
    pub fn status(&self, day: DayIndex) -> ActivityStatus {
        match self.active_until {
            Some(until) if day <= until => ActivityStatus::Active,
            _ => ActivityStatus::Dormant,
        }
    }

    /// Extends the horizon to `day + horizon_days`. Returns true on a
    /// Dormant → Active transition, which also forgets the last bucket so
    /// the reactivating event emits.
    pub fn activate(&mut self, day: DayIndex, horizon_days: u64) -> bool {
        let was_dormant = self.status(day) == ActivityStatus::Dormant;
        if was_dormant {
            self.last_bucket = None;
        }
        let until = day.plus(horizon_days);
        self.active_until = Some(match self.active_until {
            Some(current) if current > until => current,
            _ => until,
        });
        was_dormant
    }

    /// Active → Dormant once `day` is past the horizon. The last bucket is
    /// forgotten so the next qualifying event emits right away.
    pub fn expire(&mut self, day: DayIndex) -> bool {
        match self.active_until {
            Some(until) if day > until => {
                self.active_until = None;
                self.last_bucket = None;
                true
            }
            _ => false,
        }
    }

    pub fn should_emit(&self, emission: Emission, bucket: u8) -> bool {
        match emission {
            Emission::Once => !self.fired,
            Emission::OnChange => self.last_bucket != Some(bucket),
            Emission::EveryEvent => true,
            Emission::Scheduled => false,
        }
    }

    pub fn mark_emitted(&mut self, bucket: u8) {
        self.last_bucket = Some(bucket);
        self.fired = true;
    }
}

/// Attribution for the one-shot AcquisitionSource answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionFlags {
    /// The latest open before the first enable came from the omnibox.
    pub omnibox_opened_before_enable: bool,
    pub recorded: bool,
}

/// Feature-level facts shared by several metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Day of the first `record_enabled(true)`. Opens the gate and anchors
    /// the week-compare cadence.
    pub enabled_on: Option<DayIndex>,
    pub last_usage_day: Option<DayIndex>,
    /// Last day the scheduler covered, in this process or an earlier one.
    pub last_report_day: Option<DayIndex>,
}

impl Profile {
    pub fn is_enabled(&self) -> bool {
        self.enabled_on.is_some()
    }
}
