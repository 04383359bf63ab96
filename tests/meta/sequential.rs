use std::sync::Arc;

use bayopt::prelude::*;

use crate::helpers::{recommend_label, NamedRecommender};

fn sequence(names: &[&'static str]) -> Vec<Arc<dyn Recommender>> {
    names
        .iter()
        .map(|&n| Arc::new(NamedRecommender(n)) as Arc<dyn Recommender>)
        .collect()
}

#[test]
fn test_empty_sequence_rejected() {
    let err = SequentialMetaRecommender::new(sequence(&[])).unwrap_err();
    assert!(matches!(err, Error::EmptyRecommenderSequence));
}

#[test]
fn test_advances_once_per_growth() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B", "C"])).unwrap();
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    // No growth: the same recommender is reused.
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    // Growth: advance to the next recommender.
    assert_eq!(recommend_label(&meta, 5).unwrap(), "B");
    assert_eq!(recommend_label(&meta, 5).unwrap(), "B");
    assert_eq!(recommend_label(&meta, 9).unwrap(), "C");
}

#[test]
fn test_select_without_use_never_advances() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B"])).unwrap();
    // However large the count grows, the first recommender has not
    // produced a batch yet, so selection stays put.
    assert_eq!(meta.select_recommender(0).unwrap().name(), "A");
    assert_eq!(meta.select_recommender(100).unwrap().name(), "A");
}

#[test]
fn test_raise_mode_exhaustion() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B"])).unwrap();
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    assert_eq!(recommend_label(&meta, 5).unwrap(), "B");
    let err = recommend_label(&meta, 9).unwrap_err();
    assert!(err.is_no_recommenders_left());
    assert!(matches!(
        err,
        Error::NoRecommendersLeft {
            requested: 3,
            available: 2
        }
    ));
}

#[test]
fn test_reuse_last_mode() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B"]))
        .unwrap()
        .mode(ExhaustionMode::ReuseLast);
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    assert_eq!(recommend_label(&meta, 5).unwrap(), "B");
    assert_eq!(recommend_label(&meta, 9).unwrap(), "B");
    assert_eq!(recommend_label(&meta, 13).unwrap(), "B");
}

#[test]
fn test_cyclic_mode() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B"]))
        .unwrap()
        .mode(ExhaustionMode::Cyclic);
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    assert_eq!(recommend_label(&meta, 5).unwrap(), "B");
    assert_eq!(recommend_label(&meta, 9).unwrap(), "A");
    assert_eq!(recommend_label(&meta, 13).unwrap(), "B");
}

#[test]
fn test_shrinking_dataset_is_fatal() {
    let meta = SequentialMetaRecommender::new(sequence(&["A", "B"])).unwrap();
    assert_eq!(recommend_label(&meta, 9).unwrap(), "A");
    // The error is raised before any recommender is resolved.
    let err = meta.select_recommender(4).unwrap_err();
    assert!(matches!(err, Error::DatasetShrank { last: 9, current: 4 }));
    // Not retryable: the same call keeps failing.
    assert!(meta.select_recommender(4).is_err());
}

#[test]
fn test_to_config_round_trip() {
    let meta = SequentialMetaRecommender::new(vec![
        Arc::new(RandomRecommender::with_seed(1)) as Arc<dyn Recommender>,
        Arc::new(RandomRecommender::with_seed(2)) as Arc<dyn Recommender>,
    ])
    .unwrap()
    .mode(ExhaustionMode::Cyclic);
    let config = meta.to_config().unwrap();
    assert_eq!(
        config,
        MetaRecommenderConfig::Sequential {
            recommenders: vec![
                RecommenderConfig::Random { seed: Some(1) },
                RecommenderConfig::Random { seed: Some(2) },
            ],
            mode: ExhaustionMode::Cyclic,
        }
    );
}

#[test]
fn test_stub_recommenders_are_not_serializable() {
    let meta = SequentialMetaRecommender::new(sequence(&["A"])).unwrap();
    assert!(matches!(
        meta.to_config().unwrap_err(),
        Error::NotSerializable { .. }
    ));
}
