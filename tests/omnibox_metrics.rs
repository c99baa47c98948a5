use engagement::engine::{DayIndex, EventRecorder, ManualClock};
use engagement::prefs::MemoryPreferenceStore;
use engagement::telemetry::{
    AcquisitionSource, MemorySink, ACQUISITION_SOURCE_HISTOGRAM, ENABLED_HISTOGRAM,
    OMNIBOX_OPENS_HISTOGRAM, OMNIBOX_WEEK_COMPARE_HISTOGRAM,
};
use engagement::EngineConfig;

const START_DAY: DayIndex = DayIndex(19_700);

struct Harness {
    clock: ManualClock,
    sink: MemorySink,
    recorder: EventRecorder,
}

fn setup() -> Harness {
    let clock = ManualClock::at_day(START_DAY);
    let sink = MemorySink::new();
    let recorder = EventRecorder::new(
        EngineConfig::default(),
        clock.clone(),
        MemoryPreferenceStore::new(),
        sink.clone(),
    );
    Harness { clock, sink, recorder }
}

fn fast_forward_days(h: &mut Harness, days: u64) {
    h.clock.advance_days(days);
    h.recorder.tick();
}

fn search_queries(h: &mut Harness, count: usize) {
    for _ in 0..count {
        h.recorder.record_omnibox_search_query();
    }
}

fn omnibox_opens(h: &mut Harness, count: usize) {
    for _ in 0..count {
        h.recorder.record_omnibox_open();
    }
}

#[test]
fn test_acquisition_source_sidebar() {
    let mut h = setup();
    assert_eq!(h.sink.total_count(ACQUISITION_SOURCE_HISTOGRAM), 0);

    h.recorder.handle_open_via_sidebar();
    assert_eq!(h.sink.total_count(ACQUISITION_SOURCE_HISTOGRAM), 0, "Opening alone reports nothing");

    h.recorder.record_enabled(true);
    assert_eq!(
        h.sink.bucket_count(ACQUISITION_SOURCE_HISTOGRAM, AcquisitionSource::Sidebar.answer()),
        1
    );

    h.recorder.record_omnibox_open();
    h.recorder.record_enabled(true);
    assert_eq!(h.sink.total_count(ACQUISITION_SOURCE_HISTOGRAM), 1, "Attribution fires once");
}

#[test]
fn test_acquisition_source_omnibox() {
    let mut h = setup();
    h.recorder.record_omnibox_open();
    h.recorder.record_enabled(true);

    assert_eq!(
        h.sink.bucket_count(ACQUISITION_SOURCE_HISTOGRAM, AcquisitionSource::Omnibox.answer()),
        1
    );
    assert_eq!(h.sink.total_count(ACQUISITION_SOURCE_HISTOGRAM), 1);
}

#[test]
fn test_acquisition_source_latest_surface_wins() {
    let mut h = setup();
    h.recorder.record_omnibox_open();
    h.recorder.handle_open_via_sidebar();
    h.recorder.record_enabled(true);

    assert_eq!(h.sink.last_bucket(ACQUISITION_SOURCE_HISTOGRAM), Some(AcquisitionSource::Sidebar.answer()));
}

#[test]
fn test_one_shot_idempotence() {
    let mut h = setup();
    for enabled in [true, false, true, true, false, true] {
        h.recorder.record_enabled(enabled);
    }
    assert_eq!(h.sink.total_count(ENABLED_HISTOGRAM), 1);
    assert_eq!(h.sink.total_count(ACQUISITION_SOURCE_HISTOGRAM), 1);
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), 1, "Gate opens once");
}

#[test]
fn test_omnibox_opens_gated_and_windowed() {
    let mut h = setup();
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), 0);

    // 1. Queries before the gate opens are never reported
    search_queries(&mut h, 297);
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), 0);

    // 2. Gate opens with the current (empty) state
    h.recorder.record_enabled(true);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 0), 1);
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), 1);

    // 3. Every open reports
    omnibox_opens(&mut h, 1);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 1), 1);

    omnibox_opens(&mut h, 2);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 1), 2);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 2), 1);

    // 4. Daily re-emission
    fast_forward_days(&mut h, 3);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 2), 4);

    omnibox_opens(&mut h, 12);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 2), 13);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 3), 3);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 0), 1);

    // 5. Window drains back to zero on the last day of the horizon
    fast_forward_days(&mut h, 7);
    assert_eq!(h.sink.bucket_count(OMNIBOX_OPENS_HISTOGRAM, 0), 2);
    assert_eq!(h.sink.last_bucket(OMNIBOX_OPENS_HISTOGRAM), Some(0));

    // 6. Then dormant
    let total = h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM);
    fast_forward_days(&mut h, 5);
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), total);
}

#[test]
fn test_opens_before_enable_do_not_count() {
    let mut h = setup();
    omnibox_opens(&mut h, 5);
    assert_eq!(h.sink.total_count(OMNIBOX_OPENS_HISTOGRAM), 0);

    h.recorder.record_enabled(true);
    assert_eq!(h.sink.last_bucket(OMNIBOX_OPENS_HISTOGRAM), Some(0), "Pre-enable opens were dropped");

    omnibox_opens(&mut h, 1);
    assert_eq!(h.sink.last_bucket(OMNIBOX_OPENS_HISTOGRAM), Some(1));
}

#[test]
fn test_week_compare() {
    let mut h = setup();
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 0);

    search_queries(&mut h, 10);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 0);

    h.recorder.record_enabled(true);
    omnibox_opens(&mut h, 2);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 0, "Events never emit directly");

    // 1. First closed week: nothing to compare against yet
    fast_forward_days(&mut h, 6);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 0, "Week not closed yet");
    fast_forward_days(&mut h, 1);
    assert_eq!(h.sink.bucket_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM, 0), 1);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 1);

    // 2. Second week: higher open rate
    search_queries(&mut h, 10);
    omnibox_opens(&mut h, 3);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 1);

    fast_forward_days(&mut h, 7);
    assert_eq!(h.sink.bucket_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM, 1), 1);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 2);
}

#[test]
fn test_week_compare_lower_rate() {
    let mut h = setup();
    h.recorder.record_enabled(true);
    search_queries(&mut h, 10);
    omnibox_opens(&mut h, 4);
    fast_forward_days(&mut h, 7);

    search_queries(&mut h, 10);
    omnibox_opens(&mut h, 1);
    fast_forward_days(&mut h, 7);

    assert_eq!(h.sink.bucket_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM, 0), 2);
    assert_eq!(h.sink.bucket_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM, 1), 0);
}

#[test]
fn test_week_compare_stops_without_activity() {
    let mut h = setup();
    h.recorder.record_enabled(true);
    omnibox_opens(&mut h, 2);

    fast_forward_days(&mut h, 7);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 1);

    // No open or query since the enable day: the horizon has passed.
    fast_forward_days(&mut h, 14);
    assert_eq!(h.sink.total_count(OMNIBOX_WEEK_COMPARE_HISTOGRAM), 1);
}
