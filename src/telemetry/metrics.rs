use std::collections::{BTreeMap, VecDeque};

use super::event::Sample;

/// Per-histogram bucket counts over a sample log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionSnapshot {
    pub histograms: BTreeMap<&'static str, HistogramStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistogramStats {
    pub total: u64,
    pub buckets: BTreeMap<u8, u64>,
}

impl EmissionSnapshot {
    pub fn total(&self, name: &str) -> u64 {
        self.histograms.get(name).map(|h| h.total).unwrap_or(0)
    }

    pub fn bucket(&self, name: &str, bucket: u8) -> u64 {
        self.histograms
            .get(name)
            .and_then(|h| h.buckets.get(&bucket).copied())
            .unwrap_or(0)
    }
}

pub fn compute_snapshot(samples: &VecDeque<Sample>) -> EmissionSnapshot {
    let mut snap = EmissionSnapshot::default();

    for sample in samples {
        let stats = snap.histograms.entry(sample.name).or_default();
        stats.total += 1;
        *stats.buckets.entry(sample.bucket).or_insert(0) += 1;
    }

    snap
}
