use std::sync::Arc;

use parking_lot::Mutex;

use bayopt::prelude::*;

/// A metrics sink that remembers every recorded label for assertions.
/// Clones share the same record buffer.
#[derive(Clone, Default)]
pub struct RecordingMetricsSink {
    records: Arc<Mutex<Vec<(String, f64)>>>,
}

impl RecordingMetricsSink {
    pub fn count(&self, label: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| l == label)
            .count()
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn record_value(&self, label: &str, value: f64) {
        self.records.lock().push((label.to_owned(), value));
    }
}

pub fn searchspace() -> SearchSpace {
    SearchSpace::new(vec![
        Parameter::numerical_discrete("Temperature", [10.0, 20.0, 30.0], 0.5).unwrap(),
        Parameter::categorical("Solvent", ["water", "ethanol"]).unwrap(),
    ])
    .unwrap()
}

pub fn campaign() -> Campaign {
    Campaign::new(
        searchspace(),
        Some(Objective::single(Target::max("Yield"))),
        TwoPhaseMetaRecommender::new(
            RandomRecommender::with_seed(42),
            RandomRecommender::with_seed(1337),
            2,
        ),
    )
}

/// Attaches measured yields to a recommended batch.
pub fn with_yields(batch: &Table, yields: &[f64]) -> Table {
    let mut measured = batch.clone();
    measured
        .add_column(
            "Yield",
            yields.iter().map(|&y| Value::Float(y)).collect(),
        )
        .unwrap();
    measured
}
