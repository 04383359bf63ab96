use bayopt::prelude::*;
use bayopt::telemetry::labels;

use crate::helpers::{campaign, with_yields, RecordingMetricsSink};

#[test]
fn test_batch_size_must_be_positive() {
    let mut campaign = campaign();
    let err = campaign.recommend(0).unwrap_err();
    assert!(matches!(err, Error::InvalidBatchSize { batch_size: 0 }));
}

#[test]
fn test_same_size_reask_returns_cached_batch() {
    let mut campaign = campaign();
    let first = campaign.recommend(3).unwrap();
    let second = campaign.recommend(3).unwrap();
    // Identical content, not a freshly computed batch.
    assert_eq!(first, second);
    // No second fit or recommendation was computed.
    assert_eq!(campaign.n_fits_done(), 0);
}

#[test]
fn test_cache_keyed_on_size_only() {
    let mut campaign = campaign();
    let three = campaign.recommend(3).unwrap();
    let two = campaign.recommend(2).unwrap();
    assert_eq!(two.n_rows(), 2);
    // The new batch replaces the cache; re-asking its size hits again.
    assert_eq!(campaign.recommend(2).unwrap(), two);
    // The old size is gone from the cache and gets recomputed.
    let three_again = campaign.recommend(3).unwrap();
    assert_eq!(three_again.n_rows(), 3);
    assert_eq!(three.n_rows(), 3);
}

#[test]
fn test_adding_measurements_invalidates_cache() {
    let mut campaign = campaign();
    let batch = campaign.recommend(2).unwrap();
    campaign
        .add_measurements(&with_yields(&batch, &[0.5, 0.7]), true)
        .unwrap();
    // The cache was cleared, so the same size triggers a fresh fit cycle.
    let _ = campaign.recommend(2).unwrap();
    assert_eq!(campaign.n_fits_done(), 1);
}

#[test]
fn test_failed_add_still_invalidates_cache() {
    let mut campaign = campaign();
    let batch = campaign.recommend(2).unwrap();

    // Invalid data: target column missing entirely.
    assert!(campaign.add_measurements(&batch, true).is_err());

    // The cache must not serve the stale batch after the failed add.
    let _ = campaign.recommend(2).unwrap();
    assert_eq!(campaign.n_fits_done(), 0); // still no measurements
    let sink_check = campaign.measurements().n_rows();
    assert_eq!(sink_check, 0);
}

#[test]
fn test_fit_numbers_backfilled_on_recommend() {
    let mut campaign = campaign();
    let batch = campaign.recommend(2).unwrap();
    campaign
        .add_measurements(&with_yields(&batch, &[0.5, 0.7]), true)
        .unwrap();

    // Unset until a recommendation consumes the data.
    assert_eq!(
        campaign.measurements().column(FIT_NR_COLUMN).unwrap(),
        &[Value::Missing, Value::Missing]
    );

    let _ = campaign.recommend(2).unwrap();
    assert_eq!(campaign.n_fits_done(), 1);
    assert_eq!(
        campaign.measurements().column(FIT_NR_COLUMN).unwrap(),
        &[Value::Int(1), Value::Int(1)]
    );
}

#[test]
fn test_metrics_are_recorded() {
    let sink = RecordingMetricsSink::default();
    let mut campaign = campaign().with_metrics(sink.clone());

    let _ = campaign.recommend(2).unwrap();
    assert_eq!(sink.count(labels::COUNT_RECOMMEND), 1);
    assert_eq!(sink.count(labels::BATCH_SIZE), 1);
    assert_eq!(sink.count(labels::NAKED_INITIAL_RECOMMENDATION), 1);

    // A cache hit records nothing new.
    let _ = campaign.recommend(2).unwrap();
    assert_eq!(sink.count(labels::COUNT_RECOMMEND), 1);
}
