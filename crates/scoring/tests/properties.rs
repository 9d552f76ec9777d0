//! Property tests for the similarity engine and the blender.

use data_loader::{
    Dataset, DuplicatePolicy, FeatureStore, Interaction, RatingMatrix, SparseVector,
};
use proptest::prelude::*;
use scoring::*;
use std::collections::BTreeMap;

/// Weights from subnormal-adjacent to near-overflow magnitudes
fn weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        1e-300f64..1e-150,
        0.0f64..10.0,
        1e150f64..1e300,
    ]
}

fn sparse_vector() -> impl Strategy<Value = SparseVector> {
    prop::collection::btree_map("[a-f]", weight(), 0..6)
}

fn interactions() -> impl Strategy<Value = Vec<Interaction>> {
    prop::collection::vec(
        ("u[0-4]", "i[0-6]", 0.0f64..=5.0)
            .prop_map(|(actor, target, score)| Interaction::new(actor, target, score)),
        0..40,
    )
}

fn dataset_from(rows: &[Interaction], tagged: &BTreeMap<String, SparseVector>) -> Dataset {
    let ratings = RatingMatrix::from_interactions(rows, DuplicatePolicy::LastWriteWins).unwrap();
    let features: FeatureStore = tagged
        .iter()
        .map(|(id, v)| (id.clone(), v.clone()))
        .collect();
    Dataset::new(ratings, features)
}

proptest! {
    #[test]
    fn similarity_is_symmetric(a in sparse_vector(), b in sparse_vector()) {
        prop_assert_eq!(cosine(&a, &b), cosine(&b, &a));
        prop_assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn similarity_is_bounded(a in sparse_vector(), b in sparse_vector()) {
        let c = cosine(&a, &b);
        let j = jaccard(&a, &b);
        prop_assert!((0.0..=1.0).contains(&c));
        prop_assert!(c.is_sign_positive());
        prop_assert!((0.0..=1.0).contains(&j));
    }

    #[test]
    fn self_similarity_is_one(a in sparse_vector()) {
        prop_assume!(a.values().any(|w| *w > 0.0));
        prop_assert_eq!(cosine(&a, &a), 1.0);
        prop_assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn empty_vector_scores_zero(a in sparse_vector()) {
        let empty = SparseVector::new();
        prop_assert_eq!(cosine(&empty, &a), 0.0);
        prop_assert_eq!(jaccard(&empty, &a), 0.0);
    }

    #[test]
    fn neighbors_sorted_positive_and_bounded(
        target in sparse_vector(),
        rows in prop::collection::btree_map("n[0-9]", sparse_vector(), 0..10),
        k in 0usize..6,
    ) {
        let result = neighbors(&target, &rows, k, SimilarityMetric::Cosine);

        prop_assert!(result.len() <= k);
        prop_assert!(result.iter().all(|n| n.similarity > 0.0));
        for pair in result.windows(2) {
            let ordered = pair[0].similarity > pair[1].similarity
                || (pair[0].similarity == pair[1].similarity && pair[0].id < pair[1].id);
            prop_assert!(ordered);
        }
    }

    #[test]
    fn recommend_is_deterministic_and_excludes_history(
        rows in interactions(),
        tagged in prop::collection::btree_map("i[0-6]", sparse_vector(), 0..7),
        wc in 0.0f64..2.0,
        wt in 0.0f64..2.0,
        top_n in 0usize..8,
    ) {
        let dataset = dataset_from(&rows, &tagged);
        let pool: Vec<String> = (0..7).map(|i| format!("i{}", i)).collect();

        let first = recommend("u0", &pool, &dataset, wc, wt, top_n).unwrap();
        let second = recommend("u0", &pool, &dataset, wc, wt, top_n).unwrap();
        prop_assert_eq!(&first, &second);

        prop_assert!(first.len() <= top_n);
        for rec in &first {
            prop_assert!(!dataset.ratings.has_interacted("u0", &rec.candidate_id));
            prop_assert!((0.0..=1.0).contains(&rec.breakdown.collaborative));
            prop_assert!((0.0..=1.0).contains(&rec.breakdown.content));
        }
    }

    #[test]
    fn predictions_stay_in_scale(rows in interactions(), k in 1usize..5) {
        let dataset = dataset_from(&rows, &BTreeMap::new());
        for axis in [Axis::UserBased, Axis::ItemBased] {
            let predictor = Predictor::new(k).with_axis(axis);
            let score = predictor.predict("u0", "i0", &dataset.ratings);
            prop_assert!((0.0..=5.0 + 1e-9).contains(&score));
        }
    }
}
