use bayopt::prelude::*;
use bayopt::telemetry::labels;

use crate::helpers::{campaign, with_yields, RecordingMetricsSink};

fn valid_batch() -> Table {
    let mut batch = Table::new(["Temperature", "Solvent"]);
    batch
        .push_row(vec![Value::Float(10.0), Value::Str("water".into())])
        .unwrap();
    batch
        .push_row(vec![Value::Float(20.0), Value::Str("ethanol".into())])
        .unwrap();
    batch
}

#[test]
fn test_valid_batch_is_appended_with_metadata() {
    let mut campaign = campaign();
    campaign
        .add_measurements(&with_yields(&valid_batch(), &[0.5, 0.7]), true)
        .unwrap();

    assert_eq!(campaign.n_batches_done(), 1);
    let measurements = campaign.measurements();
    assert_eq!(measurements.n_rows(), 2);
    assert_eq!(
        measurements.column(BATCH_NR_COLUMN).unwrap(),
        &[Value::Int(1), Value::Int(1)]
    );
    // Fit numbers stay unset until the next recommendation is computed.
    assert_eq!(
        measurements.column(FIT_NR_COLUMN).unwrap(),
        &[Value::Missing, Value::Missing]
    );
}

#[test]
fn test_batch_numbers_increment() {
    let mut campaign = campaign();
    campaign
        .add_measurements(&with_yields(&valid_batch(), &[0.5, 0.7]), true)
        .unwrap();
    campaign
        .add_measurements(&with_yields(&valid_batch(), &[0.4, 0.6]), true)
        .unwrap();

    assert_eq!(campaign.n_batches_done(), 2);
    assert_eq!(
        campaign.measurements().column(BATCH_NR_COLUMN).unwrap(),
        &[Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)]
    );
}

#[test]
fn test_missing_target_value_rejected_without_side_effects() {
    let mut campaign = campaign();
    let mut data = valid_batch();
    data.add_column("Yield", vec![Value::Float(0.5), Value::Missing])
        .unwrap();

    let err = campaign.add_measurements(&data, true).unwrap_err();
    assert!(matches!(err, Error::MissingTargetValues { target } if target == "Yield"));
    assert_eq!(campaign.measurements().n_rows(), 0);
    assert_eq!(campaign.n_batches_done(), 0);
}

#[test]
fn test_non_numeric_target_rejected() {
    let mut campaign = campaign();
    let mut data = valid_batch();
    data.add_column(
        "Yield",
        vec![Value::Float(0.5), Value::Str("high".into())],
    )
    .unwrap();

    let err = campaign.add_measurements(&data, true).unwrap_err();
    assert!(matches!(err, Error::NonNumericTarget { target } if target == "Yield"));
    assert_eq!(campaign.measurements().n_rows(), 0);
}

#[test]
fn test_absent_target_column_rejected() {
    let mut campaign = campaign();
    let err = campaign.add_measurements(&valid_batch(), true).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { column } if column == "Yield"));
}

#[test]
fn test_missing_parameter_value_rejected() {
    let mut campaign = campaign();
    let mut data = Table::new(["Temperature", "Solvent"]);
    data.push_row(vec![Value::Missing, Value::Str("water".into())])
        .unwrap();
    let data = with_yields(&data, &[0.5]);

    let err = campaign.add_measurements(&data, true).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingParameterValues { parameter } if parameter == "Temperature"
    ));
    assert_eq!(campaign.measurements().n_rows(), 0);
}

#[test]
fn test_non_numeric_numerical_parameter_rejected() {
    let mut campaign = campaign();
    let mut data = Table::new(["Temperature", "Solvent"]);
    data.push_row(vec![Value::Str("hot".into()), Value::Str("water".into())])
        .unwrap();
    let data = with_yields(&data, &[0.5]);

    let err = campaign.add_measurements(&data, true).unwrap_err();
    assert!(matches!(
        err,
        Error::NonNumericParameter { parameter } if parameter == "Temperature"
    ));
}

#[test]
fn test_matching_entries_marked_as_measured() {
    let mut campaign = campaign();
    campaign
        .add_measurements(&with_yields(&valid_batch(), &[0.5, 0.7]), true)
        .unwrap();
    assert_eq!(campaign.searchspace().discrete().n_measured(), 2);
}

#[test]
fn test_tolerance_flag_controls_matching() {
    let mut campaign = campaign();
    let mut data = Table::new(["Temperature", "Solvent"]);
    // 12.0 is off-grid: outside the 0.5 tolerance of the nearest value 10.0.
    data.push_row(vec![Value::Float(12.0), Value::Str("water".into())])
        .unwrap();
    let data = with_yields(&data, &[0.5]);

    campaign.add_measurements(&data, true).unwrap();
    assert_eq!(campaign.searchspace().discrete().n_measured(), 0);

    campaign.add_measurements(&data, false).unwrap();
    assert_eq!(campaign.searchspace().discrete().n_measured(), 1);
}

#[test]
fn test_metrics_are_recorded() {
    let sink = RecordingMetricsSink::default();
    let mut campaign = campaign().with_metrics(sink.clone());
    campaign
        .add_measurements(&with_yields(&valid_batch(), &[0.5, 0.7]), true)
        .unwrap();
    assert_eq!(sink.count(labels::COUNT_ADD_RESULTS), 1);
}
