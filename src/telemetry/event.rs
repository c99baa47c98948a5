use serde::{Deserialize, Serialize};

pub const ENABLED_HISTOGRAM: &str = "AIChat.Enabled";
pub const ACQUISITION_SOURCE_HISTOGRAM: &str = "AIChat.AcquisitionSource";
pub const CHAT_COUNT_HISTOGRAM: &str = "AIChat.ChatCount";
pub const AVG_PROMPT_COUNT_HISTOGRAM: &str = "AIChat.AvgPromptCount";
pub const USAGE_DAILY_HISTOGRAM: &str = "AIChat.UsageDaily";
pub const OMNIBOX_OPENS_HISTOGRAM: &str = "AIChat.OmniboxOpens";
pub const OMNIBOX_WEEK_COMPARE_HISTOGRAM: &str = "AIChat.OmniboxWeekCompare";

/// Every answer the engine can report.
// Allowed: bucket ordinals and fixed enum values.
// Forbidden: raw counts, timestamps, anything derived from chat content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Enabled,
    AcquisitionSource,
    ChatCount,
    AvgPromptsPerChat,
    UsageDaily,
    OmniboxOpens,
    OmniboxWeekCompare,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Enabled,
        MetricKind::AcquisitionSource,
        MetricKind::ChatCount,
        MetricKind::AvgPromptsPerChat,
        MetricKind::UsageDaily,
        MetricKind::OmniboxOpens,
        MetricKind::OmniboxWeekCompare,
    ];

    pub fn histogram_name(self) -> &'static str {
        match self {
            MetricKind::Enabled => ENABLED_HISTOGRAM,
            MetricKind::AcquisitionSource => ACQUISITION_SOURCE_HISTOGRAM,
            MetricKind::ChatCount => CHAT_COUNT_HISTOGRAM,
            MetricKind::AvgPromptsPerChat => AVG_PROMPT_COUNT_HISTOGRAM,
            MetricKind::UsageDaily => USAGE_DAILY_HISTOGRAM,
            MetricKind::OmniboxOpens => OMNIBOX_OPENS_HISTOGRAM,
            MetricKind::OmniboxWeekCompare => OMNIBOX_WEEK_COMPARE_HISTOGRAM,
        }
    }

    /// Stable suffix for preference keys. Never rename: persisted state is
    /// looked up by it.
    pub fn storage_name(self) -> &'static str {
        match self {
            MetricKind::Enabled => "enabled",
            MetricKind::AcquisitionSource => "acquisition_source",
            MetricKind::ChatCount => "chat_count",
            MetricKind::AvgPromptsPerChat => "avg_prompts_per_chat",
            MetricKind::UsageDaily => "usage_daily",
            MetricKind::OmniboxOpens => "omnibox_opens",
            MetricKind::OmniboxWeekCompare => "omnibox_week_compare",
        }
    }
}

/// Fixed answer for the one-shot and daily flag metrics.
pub const ANSWER_YES: u8 = 1;

/// How the user first reached the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionSource {
    Omnibox = 0,
    Sidebar = 1,
}

impl AcquisitionSource {
    pub fn answer(self) -> u8 {
        self as u8
    }
}

/// One emitted sample, as seen by a sink that keeps history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub bucket: u8,
}
