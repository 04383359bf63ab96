use bayopt::prelude::*;

use crate::helpers::with_yields;

/// A recommender that always proposes the same solvent label.
#[derive(Debug)]
struct FixedSolventRecommender(&'static str);

impl Recommender for FixedSolventRecommender {
    fn recommend(
        &self,
        batch_size: usize,
        _searchspace: &SearchSpace,
        _objective: Option<&Objective>,
        _measurements: &Table,
        _pending_experiments: Option<&Table>,
    ) -> bayopt::Result<Table> {
        let mut batch = Table::new(["Solvent"]);
        for _ in 0..batch_size {
            batch.push_row(vec![Value::Str(self.0.into())])?;
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        self.0
    }
}

fn solvent_campaign() -> Campaign {
    let searchspace = SearchSpace::new(vec![
        Parameter::categorical("Solvent", ["explore", "exploit"]).unwrap()
    ])
    .unwrap();
    Campaign::new(
        searchspace,
        Some(Objective::single(Target::max("Yield"))),
        TwoPhaseMetaRecommender::new(
            FixedSolventRecommender("explore"),
            FixedSolventRecommender("exploit"),
            2,
        ),
    )
}

#[test]
fn test_two_phase_switch_through_campaign() {
    let mut campaign = solvent_campaign();

    // Phase one: no measurements yet.
    let batch = campaign.recommend(2).unwrap();
    assert_eq!(
        batch.column("Solvent").unwrap()[0],
        Value::Str("explore".into())
    );

    // Two measurements reach the threshold; the meta recommender switches.
    campaign
        .add_measurements(&with_yields(&batch, &[0.2, 0.3]), true)
        .unwrap();
    let batch = campaign.recommend(2).unwrap();
    assert_eq!(
        batch.column("Solvent").unwrap()[0],
        Value::Str("exploit".into())
    );
}

#[test]
fn test_counters_across_iterations() {
    let mut campaign = solvent_campaign();

    for i in 0..3 {
        let batch = campaign.recommend(2).unwrap();
        campaign
            .add_measurements(&with_yields(&batch, &[0.1, 0.2]), true)
            .unwrap();
        assert_eq!(campaign.n_batches_done(), i + 1);
    }
    // Fits happen only when measurements exist at recommend time: the
    // first recommendation runs without data.
    assert_eq!(campaign.n_fits_done(), 2);

    let _ = campaign.recommend(2).unwrap();
    assert_eq!(campaign.n_fits_done(), 3);

    // Every measurement row is tagged with the fit cycle that consumed it.
    assert_eq!(
        campaign.measurements().column(FIT_NR_COLUMN).unwrap(),
        &[
            Value::Int(1),
            Value::Int(1),
            Value::Int(2),
            Value::Int(2),
            Value::Int(3),
            Value::Int(3),
        ]
    );
    assert_eq!(
        campaign.measurements().column(BATCH_NR_COLUMN).unwrap(),
        &[
            Value::Int(1),
            Value::Int(1),
            Value::Int(2),
            Value::Int(2),
            Value::Int(3),
            Value::Int(3),
        ]
    );
}

#[test]
fn test_sequential_campaign_exhaustion_surfaces() {
    use std::sync::Arc;

    let searchspace = SearchSpace::new(vec![
        Parameter::categorical("Solvent", ["explore", "exploit"]).unwrap()
    ])
    .unwrap();
    let meta = SequentialMetaRecommender::new(vec![
        Arc::new(FixedSolventRecommender("explore")) as Arc<dyn Recommender>,
    ])
    .unwrap();
    let mut campaign = Campaign::new(
        searchspace,
        Some(Objective::single(Target::max("Yield"))),
        meta,
    );

    let batch = campaign.recommend(1).unwrap();
    campaign
        .add_measurements(&with_yields(&batch, &[0.9]), true)
        .unwrap();
    let err = campaign.recommend(1).unwrap_err();
    assert!(err.is_no_recommenders_left());
}
