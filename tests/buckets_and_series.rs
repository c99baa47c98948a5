use engagement::engine::bucket::{bucket_for, bucketize, ceil_ratio, thresholds};
use engagement::engine::scheduler::ReportScheduler;
use engagement::engine::series::DailyCounterSeries;
use engagement::engine::state::{ActivityStatus, Emission, MetricState};
use engagement::engine::DayIndex;
use engagement::telemetry::{MemorySink, MetricKind, MetricsSink, CHAT_COUNT_HISTOGRAM, ENABLED_HISTOGRAM};

const D: DayIndex = DayIndex(19_700);

#[test]
fn test_bucketize_is_monotonic() {
    for kind in MetricKind::ALL {
        let Some(bounds) = thresholds(kind) else {
            continue;
        };
        let mut previous = 0;
        for value in 0..200u64 {
            let bucket = bucketize(kind, value);
            assert!(bucket >= previous, "{:?} dropped a bucket at {}", kind, value);
            previous = bucket;
        }
        assert_eq!(previous as usize, bounds.len(), "{:?} tops out in the overflow bucket", kind);
    }
}

#[test]
fn test_bucket_edges() {
    let chat = |v| bucketize(MetricKind::ChatCount, v);
    assert_eq!(chat(1), 0);
    assert_eq!(chat(2), 1);
    assert_eq!(chat(5), 1);
    assert_eq!(chat(6), 2);
    assert_eq!(chat(10), 2);
    assert_eq!(chat(11), 3);
    assert_eq!(chat(51), 5);

    let avg = |v| bucketize(MetricKind::AvgPromptsPerChat, v);
    assert_eq!(avg(1), 0);
    assert_eq!(avg(2), 1);
    assert_eq!(avg(4), 1);
    assert_eq!(avg(5), 2);
    assert_eq!(avg(8), 2);
    assert_eq!(avg(9), 3);
    assert_eq!(avg(16), 4);

    let opens = |v| bucketize(MetricKind::OmniboxOpens, v);
    assert_eq!(opens(0), 0);
    assert_eq!(opens(1), 1);
    assert_eq!(opens(2), 1);
    assert_eq!(opens(3), 2);
    assert_eq!(opens(12), 2);
    assert_eq!(opens(13), 3);
    assert_eq!(opens(26), 4);
    assert_eq!(opens(51), 5);

    assert_eq!(bucketize(MetricKind::OmniboxWeekCompare, 0), 0);
    assert_eq!(bucketize(MetricKind::OmniboxWeekCompare, 1), 1);
    assert_eq!(bucketize(MetricKind::Enabled, 42), 0, "Flag metrics have no table");
}

#[test]
fn test_bucket_for_custom_table() {
    let bounds = [3, 7];
    assert_eq!(bucket_for(&bounds, 0), 0);
    assert_eq!(bucket_for(&bounds, 3), 0);
    assert_eq!(bucket_for(&bounds, 4), 1);
    assert_eq!(bucket_for(&bounds, 8), 2);
    assert_eq!(bucket_for(&[], 8), 0);
}

#[test]
fn test_ceil_ratio() {
    assert_eq!(ceil_ratio(7, 2), Some(4));
    assert_eq!(ceil_ratio(8, 2), Some(4));
    assert_eq!(ceil_ratio(0, 3), Some(0));
    assert_eq!(ceil_ratio(5, 0), None);
}

#[test]
fn test_series_prunes_on_advance() {
    let mut series = DailyCounterSeries::new(7, D);
    series.add_today(3);
    assert_eq!(series.total(), 3);

    series.advance_and_prune(D.plus(6));
    assert_eq!(series.total(), 3, "Still inside the window");

    series.advance_and_prune(D.plus(7));
    assert_eq!(series.total(), 0);
    assert_eq!(series.entries().count(), 0);
}

#[test]
fn test_series_from_entries_discards_out_of_window() {
    let mut series = DailyCounterSeries::from_entries(
        7,
        D,
        vec![(D.minus(7), 5), (D.minus(6), 1), (D.plus(1), 9), (D, 0), (D, 2)],
    );
    let kept: Vec<_> = series.entries().collect();
    assert_eq!(kept, vec![(D.minus(6), 1), (D, 2)]);

    assert_eq!(series.total(), 3);
    assert_eq!(series.sum_between(D.minus(6), D.minus(6)), 1);
    assert_eq!(series.sum_between(D, D.minus(6)), 0, "Empty range");
    assert_eq!(series.trailing_sum(1), 2);
    assert_eq!(series.trailing_sum(0), 0);
}

#[test]
fn test_series_cursor_never_moves_backwards() {
    let mut series = DailyCounterSeries::new(7, D);
    series.advance_and_prune(D.minus(3));
    assert_eq!(series.today(), D);

    series.add_today(1);
    assert_eq!(series.entries().collect::<Vec<_>>(), vec![(D, 1)]);

    assert_eq!(DailyCounterSeries::new(0, D).retention_days(), 1);
}

#[test]
fn test_metric_state_horizon() {
    let mut state = MetricState::default();
    assert_eq!(state.status(D), ActivityStatus::Dormant);

    assert!(state.activate(D, 7), "Dormant -> Active");
    assert!(!state.activate(D.plus(2), 3), "Shorter horizon keeps the later bound");
    assert_eq!(state.active_until, Some(D.plus(7)));
    assert_eq!(state.status(D.plus(7)), ActivityStatus::Active);

    state.mark_emitted(2);
    assert!(!state.expire(D.plus(7)));
    assert!(state.expire(D.plus(8)));
    assert_eq!(state.active_until, None);
    assert_eq!(state.last_bucket, None);
    assert!(state.fired, "One-shot history survives expiry");
}

#[test]
fn test_reactivation_forgets_last_bucket() {
    // Stale state as a restart past the horizon would load it
    let mut state = MetricState {
        last_bucket: Some(0),
        active_until: Some(D.plus(7)),
        fired: true,
    };
    assert!(state.activate(D.plus(20), 7));
    assert_eq!(state.last_bucket, None);
    assert!(state.should_emit(Emission::OnChange, 0));

    state.mark_emitted(0);
    assert!(!state.activate(D.plus(21), 7), "Already active");
    assert_eq!(state.last_bucket, Some(0));
}

#[test]
fn test_emission_rules() {
    let mut state = MetricState::default();
    assert!(state.should_emit(Emission::Once, 0));
    assert!(state.should_emit(Emission::OnChange, 0));

    state.mark_emitted(0);
    assert!(!state.should_emit(Emission::Once, 1));
    assert!(!state.should_emit(Emission::OnChange, 0));
    assert!(state.should_emit(Emission::OnChange, 1));
    assert!(state.should_emit(Emission::EveryEvent, 0));
    assert!(!state.should_emit(Emission::Scheduled, 1));
}

#[test]
fn test_scheduler_unseen_days() {
    let mut scheduler = ReportScheduler::new(D);
    assert_eq!(scheduler.take_unseen_days(D).count(), 0);

    let days: Vec<_> = scheduler.take_unseen_days(D.plus(3)).collect();
    assert_eq!(days, vec![D.plus(1), D.plus(2), D.plus(3)]);
    assert_eq!(scheduler.last_seen(), D.plus(3));

    // Clock went back: nothing to replay, no rewind
    assert_eq!(scheduler.take_unseen_days(D.plus(1)).count(), 0);
    assert_eq!(scheduler.last_seen(), D.plus(3));
}

#[test]
fn test_scheduler_resume() {
    // Fresh store: the construction day is covered by direct emission
    let mut fresh = ReportScheduler::resume(None, D);
    assert_eq!(fresh.take_unseen_days(D).count(), 0);

    // Restart on a later day: only that day is reported
    let mut later = ReportScheduler::resume(Some(D), D.plus(4));
    let days: Vec<_> = later.take_unseen_days(D.plus(4)).collect();
    assert_eq!(days, vec![D.plus(4)]);

    // Same day: already covered
    let mut same = ReportScheduler::resume(Some(D), D);
    assert_eq!(same.take_unseen_days(D).count(), 0);

    // Clock behind the stored cursor: keep the cursor
    let behind = ReportScheduler::resume(Some(D.plus(2)), D);
    assert_eq!(behind.last_seen(), D.plus(2));
}

#[test]
fn test_period_boundaries() {
    assert!(!ReportScheduler::is_period_boundary(D, D, 7));
    assert!(!ReportScheduler::is_period_boundary(D.plus(6), D, 7));
    assert!(ReportScheduler::is_period_boundary(D.plus(7), D, 7));
    assert!(!ReportScheduler::is_period_boundary(D.plus(8), D, 7));
    assert!(ReportScheduler::is_period_boundary(D.plus(14), D, 7));
    assert!(!ReportScheduler::is_period_boundary(D.minus(7), D, 7));
    assert!(!ReportScheduler::is_period_boundary(D.plus(7), D, 0));
}

#[test]
fn test_memory_sink_snapshot() {
    let observer = MemorySink::new();
    let mut sink = observer.clone();

    sink.emit(CHAT_COUNT_HISTOGRAM, 0);
    sink.emit(CHAT_COUNT_HISTOGRAM, 2);
    sink.emit(CHAT_COUNT_HISTOGRAM, 2);
    sink.emit(ENABLED_HISTOGRAM, 1);

    let snapshot = observer.snapshot();
    assert_eq!(snapshot.total(CHAT_COUNT_HISTOGRAM), 3);
    assert_eq!(snapshot.bucket(CHAT_COUNT_HISTOGRAM, 2), 2);
    assert_eq!(snapshot.bucket(ENABLED_HISTOGRAM, 1), 1);
    assert_eq!(snapshot.total("AIChat.Unknown"), 0);
    assert_eq!(observer.last_bucket(CHAT_COUNT_HISTOGRAM), Some(2));

    observer.clear();
    assert!(sink.samples().is_empty());
}
