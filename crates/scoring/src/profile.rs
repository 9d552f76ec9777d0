//! Helper functions to build an ActorContext from a Dataset
//!
//! The context gathers everything the blender needs about one actor up
//! front: the set of targets it already interacted with (for exclusion) and
//! its aggregated feature profile (for content scoring).

use data_loader::{Dataset, EntityId, FeatureStore, FeatureVector, RatingMatrix};
use std::collections::BTreeSet;

/// Per-request view of one actor
#[derive(Debug, Clone, Default)]
pub struct ActorContext {
    pub actor_id: EntityId,

    /// Targets the actor has a recorded interaction with
    pub interacted: BTreeSet<EntityId>,

    /// Aggregated tag weights (see [`build_actor_profile`])
    pub profile: FeatureVector,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<EntityId>) -> Self {
        Self {
            actor_id: actor_id.into(),
            ..Default::default()
        }
    }

    /// No interactions and no feature history
    pub fn is_cold_start(&self) -> bool {
        self.interacted.is_empty() && self.profile.values().all(|w| *w == 0.0)
    }

    /// The `n` heaviest profile tags, ties broken by tag name
    pub fn top_tags(&self, n: usize) -> Vec<(&str, f64)> {
        let mut tags: Vec<(&str, f64)> = self
            .profile
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .map(|(tag, w)| (tag.as_str(), *w))
            .collect();
        tags.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.truncate(n);
        tags
    }
}

/// Build an ActorContext for `actor_id`
///
/// An actor with no data is not an error; it yields an empty (cold-start)
/// context.
pub fn build_actor_context(dataset: &Dataset, actor_id: &str) -> ActorContext {
    let mut context = ActorContext::new(actor_id);

    if let Some(row) = dataset.ratings.get_actor_vector(actor_id) {
        context.interacted = row.keys().cloned().collect();
    }
    context.profile = build_actor_profile(actor_id, &dataset.ratings, &dataset.features);

    context
}

/// Aggregate an actor's feature profile
///
/// Starts from the actor's own registered feature vector (if any), then adds
/// the feature vector of every target it interacted with, scaled by the
/// interaction score.
pub fn build_actor_profile(
    actor_id: &str,
    ratings: &RatingMatrix,
    features: &FeatureStore,
) -> FeatureVector {
    let mut profile = features.get(actor_id).cloned().unwrap_or_default();

    let Some(row) = ratings.get_actor_vector(actor_id) else {
        return profile;
    };

    for (target_id, &score) in row {
        if let Some(target_features) = features.get(target_id) {
            for (tag, &weight) in target_features {
                *profile.entry(tag.clone()).or_insert(0.0) += score * weight;
            }
        }
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{DuplicatePolicy, Interaction};

    fn tags(entries: &[&str]) -> FeatureVector {
        entries.iter().map(|t| (t.to_string(), 1.0)).collect()
    }

    fn create_test_dataset() -> Dataset {
        let interactions = vec![
            Interaction::new("u1", "i1", 5.0),
            Interaction::new("u1", "i2", 2.0),
        ];
        let ratings =
            RatingMatrix::from_interactions(&interactions, DuplicatePolicy::default()).unwrap();

        let mut features = FeatureStore::new();
        features.insert("i1", tags(&["action", "sci-fi"]));
        features.insert("i2", tags(&["action", "drama"]));
        features.insert("u2", tags(&["comedy"]));

        Dataset::new(ratings, features)
    }

    #[test]
    fn test_profile_weighted_by_score() {
        let dataset = create_test_dataset();
        let profile = build_actor_profile("u1", &dataset.ratings, &dataset.features);

        assert_eq!(profile["action"], 7.0);
        assert_eq!(profile["sci-fi"], 5.0);
        assert_eq!(profile["drama"], 2.0);
    }

    #[test]
    fn test_profile_from_explicit_features() {
        let dataset = create_test_dataset();
        let context = build_actor_context(&dataset, "u2");

        assert!(context.interacted.is_empty());
        assert_eq!(context.profile["comedy"], 1.0);
        assert!(!context.is_cold_start());
    }

    #[test]
    fn test_context_interacted_and_top_tags() {
        let dataset = create_test_dataset();
        let context = build_actor_context(&dataset, "u1");

        assert_eq!(context.interacted.len(), 2);
        assert!(context.interacted.contains("i1"));
        assert_eq!(context.top_tags(2), vec![("action", 7.0), ("sci-fi", 5.0)]);
    }

    #[test]
    fn test_cold_start_actor() {
        let dataset = create_test_dataset();
        let context = build_actor_context(&dataset, "nobody");

        assert!(context.is_cold_start());
        assert!(context.profile.is_empty());
    }
}
