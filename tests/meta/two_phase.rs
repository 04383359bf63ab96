use bayopt::prelude::*;

use crate::helpers::{recommend_label, NamedRecommender};

fn two_phase(remain_switched: bool) -> TwoPhaseMetaRecommender {
    TwoPhaseMetaRecommender::new(NamedRecommender("initial"), NamedRecommender("main"), 3)
        .remain_switched(remain_switched)
}

#[test]
fn test_switches_at_threshold() {
    let meta = two_phase(false);
    assert_eq!(meta.select_recommender(0).unwrap().name(), "initial");
    assert_eq!(meta.select_recommender(2).unwrap().name(), "initial");
    assert_eq!(meta.select_recommender(3).unwrap().name(), "main");
    assert_eq!(meta.select_recommender(7).unwrap().name(), "main");
}

#[test]
fn test_switches_back_when_not_sticky() {
    let meta = two_phase(false);
    let selections: Vec<&str> = [0, 2, 3, 2]
        .into_iter()
        .map(|n| {
            let selected = meta.select_recommender(n).unwrap();
            if selected.name() == "initial" { "initial" } else { "main" }
        })
        .collect();
    assert_eq!(selections, vec!["initial", "initial", "main", "initial"]);
}

#[test]
fn test_remains_switched_when_sticky() {
    let meta = two_phase(true);
    let selections: Vec<&str> = [0, 2, 3, 2]
        .into_iter()
        .map(|n| {
            let selected = meta.select_recommender(n).unwrap();
            if selected.name() == "initial" { "initial" } else { "main" }
        })
        .collect();
    // The fourth call still selects the switched recommender even though
    // the count dropped below the threshold.
    assert_eq!(selections, vec!["initial", "initial", "main", "main"]);
}

#[test]
fn test_recommend_delegates_to_selected() {
    let meta = two_phase(false);
    assert_eq!(recommend_label(&meta, 0).unwrap(), "initial");
    assert_eq!(recommend_label(&meta, 5).unwrap(), "main");
}

#[test]
fn test_measurement_count_decrease_is_not_an_error() {
    // Unlike the sequential variants, the two-phase meta recommender
    // tolerates arbitrary counts; it always returns a recommender.
    let meta = two_phase(false);
    assert!(meta.select_recommender(10).is_ok());
    assert!(meta.select_recommender(0).is_ok());
}
