use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bayopt::prelude::*;

use crate::helpers::{recommend_label, NamedRecommender};

fn finite(names: &'static [&'static str]) -> StreamingSequentialMetaRecommender {
    StreamingSequentialMetaRecommender::from_iterator(
        names
            .iter()
            .map(|&n| Arc::new(NamedRecommender(n)) as Arc<dyn Recommender>)
            // Collect so the iterator owns its items and is Send + 'static.
            .collect::<Vec<_>>(),
    )
}

#[test]
fn test_first_call_always_advances() {
    let meta = finite(&["A", "B"]);
    // Even with zero measurements the sentinel makes the first call pull
    // from the source.
    assert_eq!(meta.select_recommender(0).unwrap().name(), "A");
}

#[test]
fn test_reuse_without_growth() {
    let meta = finite(&["A", "B"]);
    assert_eq!(meta.select_recommender(0).unwrap().name(), "A");
    assert_eq!(meta.select_recommender(0).unwrap().name(), "A");
    assert_eq!(meta.select_recommender(1).unwrap().name(), "B");
    assert_eq!(meta.select_recommender(1).unwrap().name(), "B");
}

#[test]
fn test_exhaustion_is_non_recoverable() {
    let meta = finite(&["A"]);
    assert_eq!(recommend_label(&meta, 0).unwrap(), "A");
    let err = meta.select_recommender(5).unwrap_err();
    assert!(matches!(
        err,
        Error::NoRecommendersLeft {
            requested: 2,
            available: 1
        }
    ));
}

#[test]
fn test_shrinking_dataset_is_fatal() {
    let meta = finite(&["A", "B"]);
    assert_eq!(recommend_label(&meta, 5).unwrap(), "A");
    assert!(matches!(
        meta.select_recommender(3).unwrap_err(),
        Error::DatasetShrank { last: 5, current: 3 }
    ));
}

#[test]
fn test_infinite_source() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulls);
    let meta = StreamingSequentialMetaRecommender::from_source(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(NamedRecommender("A")) as Arc<dyn Recommender>)
    });

    // Three growth observations pull exactly three times; reuse pulls
    // nothing.
    for n in [0, 0, 3, 3, 7] {
        assert_eq!(recommend_label(&meta, n).unwrap(), "A");
    }
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_serialization_always_fails() {
    let meta = finite(&["A", "B"]);
    assert!(matches!(
        meta.to_config().unwrap_err(),
        Error::NotSerializable { type_name } if type_name == "StreamingSequentialMetaRecommender"
    ));

    // Even a streaming recommender wrapping serializable recommenders has
    // no serializable identity.
    let meta = StreamingSequentialMetaRecommender::from_iterator(vec![
        Arc::new(RandomRecommender::with_seed(0)) as Arc<dyn Recommender>,
    ]);
    assert!(meta.to_config().is_err());
}
