//! The metrics engine: counters, per-metric state, the lazy scheduler and
//! the recorder that ties them to a clock, a store and a sink.
//!
//! # SAFETY INVARIANT
//! Nothing here blocks, spawns or holds a timer. Day boundaries are derived
//! from the clock at call time.

pub mod bucket;
pub mod counters;
pub mod ledger;
pub mod persist;
pub mod recorder;
pub mod scheduler;
pub mod series;
pub mod state;
pub mod time;

pub use recorder::{EngineStatus, EventRecorder, MetricStatus};
pub use state::ActivityStatus;
pub use time::{Clock, DayIndex, ManualClock, SystemClock};
