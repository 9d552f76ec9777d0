//! Integration tests for the pipeline.
//!
//! These tests run the blender and the filters together over a
//! small realistic dataset.

use data_loader::{Dataset, DuplicatePolicy, FeatureStore, FeatureVector, Interaction, RatingMatrix};
use pipeline::FilterPipeline;
use pipeline::filters::*;
use scoring::{BlendWeights, HybridBlender, Predictor, build_actor_context};

fn tags(entries: &[&str]) -> FeatureVector {
    entries.iter().map(|t| (t.to_string(), 1.0)).collect()
}

fn create_test_dataset() -> Dataset {
    let interactions = vec![
        Interaction::new("u1", "i1", 5.0),
        Interaction::new("u1", "i2", 3.0),
        Interaction::new("u2", "i1", 4.0),
        Interaction::new("u2", "i2", 5.0),
        Interaction::new("u2", "i3", 2.0),
    ];
    let ratings = RatingMatrix::from_interactions(&interactions, DuplicatePolicy::default()).unwrap();

    let mut features = FeatureStore::new();
    features.insert("i1", tags(&["action", "sci-fi"]));
    features.insert("i2", tags(&["action"]));
    features.insert("i4", tags(&["sci-fi"]));
    features.insert("i5", tags(&["romance"]));

    Dataset::new(ratings, features)
}

fn pool() -> Vec<String> {
    ["i1", "i2", "i3", "i4", "i5", "i6"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_full_pipeline() {
    let dataset = create_test_dataset();
    let blender = HybridBlender::new(Predictor::new(5));
    let recs = blender
        .recommend("u1", &pool(), &dataset, BlendWeights::default(), 10)
        .unwrap();

    // History excluded by the blender; i5 and i6 share nothing with u1
    assert_eq!(recs.len(), 4);

    let context = build_actor_context(&dataset, "u1");
    let pipeline = FilterPipeline::new().add_filter(ZeroEvidenceFilter);
    let filtered = pipeline.apply(recs, &context).unwrap();

    let ids: Vec<&str> = filtered.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"i3"));
    assert!(ids.contains(&"i4"));
    for pair in filtered.windows(2) {
        assert!(pair[0].blended_score >= pair[1].blended_score);
    }
}

#[test]
fn test_history_filtered_after_scoring() {
    let dataset = create_test_dataset();
    let blender = HybridBlender::new(Predictor::new(5)).with_exclusion(false);
    let recs = blender
        .recommend("u1", &pool(), &dataset, BlendWeights::default(), 10)
        .unwrap();
    assert!(recs.iter().any(|r| r.candidate_id == "i1"));

    let context = build_actor_context(&dataset, "u1");
    let pipeline = FilterPipeline::new()
        .add_filter(AlreadyInteractedFilter)
        .add_filter(ZeroEvidenceFilter);
    let filtered = pipeline.apply(recs, &context).unwrap();

    assert!(filtered
        .iter()
        .all(|r| !context.interacted.contains(&r.candidate_id)));
    assert!(!filtered.is_empty());
}

#[test]
fn test_minimum_score_on_cold_start() {
    let dataset = create_test_dataset();
    let blender = HybridBlender::default();
    let recs = blender
        .recommend("newcomer", &pool(), &dataset, BlendWeights::default(), 10)
        .unwrap();
    assert_eq!(recs.len(), pool().len());

    let context = build_actor_context(&dataset, "newcomer");
    assert!(context.is_cold_start());

    let pipeline = FilterPipeline::new().add_filter(MinimumScoreFilter::new(0.01));
    let filtered = pipeline.apply(recs, &context).unwrap();
    assert!(filtered.is_empty());
}
