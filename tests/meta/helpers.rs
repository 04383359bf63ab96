use bayopt::prelude::*;

/// A stub recommender identified by name, returning a constant-label
/// batch. Used to observe which recommender a meta recommender selected.
#[derive(Debug)]
pub struct NamedRecommender(pub &'static str);

impl Recommender for NamedRecommender {
    fn recommend(
        &self,
        batch_size: usize,
        _searchspace: &SearchSpace,
        _objective: Option<&Objective>,
        _measurements: &Table,
        _pending_experiments: Option<&Table>,
    ) -> bayopt::Result<Table> {
        let mut batch = Table::new(["x"]);
        for _ in 0..batch_size {
            batch.push_row(vec![Value::Str(self.0.into())])?;
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        self.0
    }
}

pub fn space() -> SearchSpace {
    SearchSpace::new(vec![
        Parameter::numerical_discrete("x", [1.0, 2.0, 3.0, 4.0], 0.1).unwrap()
    ])
    .unwrap()
}

/// A measurement table with `n` rows; meta recommenders only look at the
/// row count.
pub fn measurements(n: usize) -> Table {
    let mut table = Table::new(["x", "Yield"]);
    for i in 0..n {
        #[allow(clippy::cast_precision_loss)]
        table
            .push_row(vec![Value::Float(i as f64), Value::Float(0.0)])
            .unwrap();
    }
    table
}

/// Drives a meta recommender through one recommend call with `n`
/// measurement rows and returns the label of the recommender that
/// produced the batch.
pub fn recommend_label(meta: &dyn MetaRecommender, n: usize) -> bayopt::Result<&'static str> {
    let batch = meta.recommend(1, &space(), None, &measurements(n), None)?;
    match &batch.column("x").unwrap()[0] {
        Value::Str(s) => Ok(match s.as_str() {
            "A" => "A",
            "B" => "B",
            "C" => "C",
            "initial" => "initial",
            "main" => "main",
            other => panic!("unexpected label {other}"),
        }),
        other => panic!("unexpected cell {other:?}"),
    }
}
