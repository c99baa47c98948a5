//! Raw value → bucket ordinal.
//!
//! Each table lists the inclusive upper bound of every bucket in ascending
//! order; values above the last bound land in one extra overflow bucket.
//! Tables are policy data and may be retuned freely as long as they stay
//! ascending.

use crate::telemetry::MetricKind;

/// Trailing-window chat count: 1 | 2-5 | 6-10 | 11-20 | 21-50 | 51+
pub const CHAT_COUNT_BUCKETS: &[u64] = &[1, 5, 10, 20, 50];

/// Rounded-up prompts per chat: ≤1 | 2-4 | 5-8 | 9-15 | 16+
pub const AVG_PROMPTS_BUCKETS: &[u64] = &[1, 4, 8, 15];

/// Trailing-window omnibox opens: 0 | 1-2 | 3-12 | 13-25 | 26-50 | 51+
pub const OMNIBOX_OPENS_BUCKETS: &[u64] = &[0, 2, 12, 25, 50];

/// Week-over-week growth of the open rate, in per-mille: none | some
pub const WEEK_COMPARE_BUCKETS: &[u64] = &[0];

pub fn thresholds(kind: MetricKind) -> Option<&'static [u64]> {
    match kind {
        MetricKind::ChatCount => Some(CHAT_COUNT_BUCKETS),
        MetricKind::AvgPromptsPerChat => Some(AVG_PROMPTS_BUCKETS),
        MetricKind::OmniboxOpens => Some(OMNIBOX_OPENS_BUCKETS),
        MetricKind::OmniboxWeekCompare => Some(WEEK_COMPARE_BUCKETS),
        // Flag metrics report fixed answers.
        MetricKind::Enabled | MetricKind::AcquisitionSource | MetricKind::UsageDaily => None,
    }
}

/// Index of the first bound `>= value`.
pub fn bucket_for(bounds: &[u64], value: u64) -> u8 {
    bounds
        .iter()
        .position(|&upper| value <= upper)
        .unwrap_or(bounds.len()) as u8
}

/// Pure: no clock, no store. Flag metrics have no table and always map to
/// bucket zero here.
pub fn bucketize(kind: MetricKind, value: u64) -> u8 {
    match thresholds(kind) {
        Some(bounds) => bucket_for(bounds, value),
        None => 0,
    }
}

/// `ceil(numerator / denominator)`, or `None` when there is no denominator.
pub fn ceil_ratio(numerator: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator.div_ceil(denominator))
}
