use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use super::event::Sample;
use super::metrics::{compute_snapshot, EmissionSnapshot};

const MAX_SAMPLES: usize = 10_000;

/// Receiver of `(metric name, bucket)` samples.
/// Fire-and-forget: the engine never learns whether a sample was kept.
pub trait MetricsSink: Send {
    fn emit(&mut self, name: &'static str, bucket: u8);
}

/// Bounded in-memory log of emitted samples.
///
/// Clones share the same log, so a host can hand one clone to the recorder
/// and query the other, the way a histogram tester observes a live process.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<VecDeque<Sample>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_SAMPLES))),
        }
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.buffer().iter().copied().collect()
    }

    /// Number of samples recorded under `name`, any bucket.
    pub fn total_count(&self, name: &str) -> usize {
        self.buffer().iter().filter(|s| s.name == name).count()
    }

    pub fn bucket_count(&self, name: &str, bucket: u8) -> usize {
        self.buffer()
            .iter()
            .filter(|s| s.name == name && s.bucket == bucket)
            .count()
    }

    /// Most recent bucket emitted under `name`.
    pub fn last_bucket(&self, name: &str) -> Option<u8> {
        self.buffer()
            .iter()
            .rev()
            .find(|s| s.name == name)
            .map(|s| s.bucket)
    }

    pub fn snapshot(&self) -> EmissionSnapshot {
        compute_snapshot(&self.buffer())
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }
}

impl MetricsSink for MemorySink {
    fn emit(&mut self, name: &'static str, bucket: u8) {
        let mut buffer = self.buffer();
        if buffer.len() >= MAX_SAMPLES {
            buffer.pop_front();
        }
        buffer.push_back(Sample { name, bucket });
    }
}

/// Writes every sample to the `tracing` pipeline. Used by the host binary in
/// place of a real uploader.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn emit(&mut self, name: &'static str, bucket: u8) {
        info!(metric = name, bucket, "sample");
    }
}
