//! Mapping between the in-memory ledger and the preference store.
//!
//! Best effort in both directions: unreadable or malformed values load as
//! "no prior data", failed writes are logged and dropped. The in-memory
//! ledger stays authoritative for the life of the process.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::counters::Counter;
use super::ledger::Ledger;
use super::series::DailyCounterSeries;
use super::time::DayIndex;
use crate::config::EngineConfig;
use crate::prefs::PreferenceStore;
use crate::telemetry::MetricKind;

pub const KEY_PREFIX: &str = "engagement";

pub fn counter_key(counter: Counter) -> String {
    format!("{}.counter.{}", KEY_PREFIX, counter.storage_name())
}

pub fn metric_key(kind: MetricKind) -> String {
    format!("{}.metric.{}", KEY_PREFIX, kind.storage_name())
}

pub fn acquisition_key() -> String {
    format!("{}.acquisition", KEY_PREFIX)
}

pub fn profile_key() -> String {
    format!("{}.profile", KEY_PREFIX)
}

/// On-disk shape of a counter series: day index → count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSeries {
    pub days: BTreeMap<u64, u64>,
}

impl From<&DailyCounterSeries> for StoredSeries {
    fn from(series: &DailyCounterSeries) -> Self {
        Self {
            days: series.entries().map(|(day, count)| (day.0, count)).collect(),
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "preference read failed, starting empty");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed preference");
            None
        }
    }
}

fn write_json<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key, error = %e, "failed to encode preference");
            return;
        }
    };
    if let Err(e) = store.set(key, &bytes) {
        warn!(key, error = %e, "preference write failed, keeping in-memory state");
    }
}

/// Reads every key of the namespace once. Missing or broken pieces fall
/// back to their empty defaults independently of each other.
pub fn load_ledger(store: &dyn PreferenceStore, config: EngineConfig, today: DayIndex) -> Ledger {
    let mut ledger = Ledger::new(config, today);

    for counter in Counter::ALL {
        if let Some(stored) = read_json::<StoredSeries>(store, &counter_key(counter)) {
            let retention = counter.retention_days(&ledger.config);
            let series = DailyCounterSeries::from_entries(
                retention,
                today,
                stored.days.into_iter().map(|(day, count)| (DayIndex(day), count)),
            );
            ledger.counters.replace(counter, series);
        }
    }

    for kind in MetricKind::ALL {
        if let Some(state) = read_json(store, &metric_key(kind)) {
            *ledger.state_mut(kind) = state;
        }
        // Horizon passed while no process was running.
        ledger.state_mut(kind).expire(today);
    }

    if let Some(flags) = read_json(store, &acquisition_key()) {
        ledger.acquisition = flags;
    }
    if let Some(profile) = read_json(store, &profile_key()) {
        ledger.profile = profile;
    }

    ledger
}

pub fn save_counter(store: &mut dyn PreferenceStore, ledger: &Ledger, counter: Counter) {
    let stored = StoredSeries::from(ledger.counters.series(counter));
    write_json(store, &counter_key(counter), &stored);
}

pub fn save_metric(store: &mut dyn PreferenceStore, ledger: &Ledger, kind: MetricKind) {
    write_json(store, &metric_key(kind), ledger.state(kind));
}

pub fn save_acquisition(store: &mut dyn PreferenceStore, ledger: &Ledger) {
    write_json(store, &acquisition_key(), &ledger.acquisition);
}

pub fn save_profile(store: &mut dyn PreferenceStore, ledger: &Ledger) {
    write_json(store, &profile_key(), &ledger.profile);
}
