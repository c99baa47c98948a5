//! Emission side of the engine: metric identities and the sinks that
//! receive samples.
//!
//! # PRIVACY INVARIANT
//! A sample is a histogram name plus a small bucket ordinal. Raw counts,
//! timestamps and user content **NEVER** leave the engine.

pub mod event;
pub mod metrics;
pub mod sink;

pub use event::*;
pub use metrics::{EmissionSnapshot, HistogramStats};
pub use sink::{MemorySink, MetricsSink, TracingSink};
