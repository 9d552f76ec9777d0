//! Similarity Engine
//!
//! Pairwise similarity between sparse vectors and top-k neighbour selection.
//!
//! ## Measures
//! - Cosine: `dot(A, B) / (|A| * |B|)`, 0.0 when either vector has zero magnitude
//! - Jaccard: `|A ∩ B| / |A ∪ B|` over the keys with positive weight, 0.0 for
//!   two empty sets
//!
//! Both are symmetric. Vectors are ordered maps, so the shared keys of two
//! vectors are visited in the same order whichever side drives the loop and
//! `sim(a, b)` equals `sim(b, a)` exactly, not just approximately.
//!
//! ## Caching
//! Precomputed similarities live in a [`SimilarityMatrix`] that the caller
//! owns and passes in through the [`SimilarityLookup`] trait. Nothing in this
//! module keeps state between calls.

use data_loader::{EntityId, SparseVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Which similarity measure to apply to a pair of vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    Jaccard,
}

impl SimilarityMetric {
    pub fn compute(&self, a: &SparseVector, b: &SparseVector) -> f64 {
        match self {
            SimilarityMetric::Cosine => cosine(a, b),
            SimilarityMetric::Jaccard => jaccard(a, b),
        }
    }
}

/// Similarity of two vectors under `metric`
pub fn similarity(metric: SimilarityMetric, a: &SparseVector, b: &SparseVector) -> f64 {
    metric.compute(a, b)
}

/// Cosine similarity of two sparse vectors
///
/// Keys missing from one side count as zero. Returns 0.0 if either vector
/// has zero magnitude. Each vector is scaled by its largest absolute weight
/// first, so very large or very small weights neither overflow nor vanish.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let scale_a = max_magnitude(a);
    let scale_b = max_magnitude(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let (small, large, scale_small, scale_large) = if a.len() <= b.len() {
        (a, b, scale_a, scale_b)
    } else {
        (b, a, scale_b, scale_a)
    };

    // fold from +0.0: an empty f64 `sum` is -0.0
    let dot = small
        .iter()
        .filter_map(|(key, x)| large.get(key).map(|y| (x / scale_small) * (y / scale_large)))
        .fold(0.0_f64, |acc, term| acc + term);

    let norm_a = scaled_norm_squared(a, scale_a);
    let norm_b = scaled_norm_squared(b, scale_b);

    // sqrt of the product keeps sim(a, a) at exactly 1.0
    (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0)
}

fn max_magnitude(v: &SparseVector) -> f64 {
    v.values().fold(0.0_f64, |max, w| max.max(w.abs()))
}

/// Squared norm of `v / scale`; at least 1.0 for a non-zero vector
fn scaled_norm_squared(v: &SparseVector, scale: f64) -> f64 {
    v.values()
        .map(|w| (w / scale) * (w / scale))
        .fold(0.0_f64, |acc, term| acc + term)
}

/// Jaccard similarity of the key sets of two vectors
///
/// Only keys with a positive weight are members of the set.
pub fn jaccard(a: &SparseVector, b: &SparseVector) -> f64 {
    let members_a = a.values().filter(|w| **w > 0.0).count();
    let members_b = b.values().filter(|w| **w > 0.0).count();

    let intersection = a
        .iter()
        .filter(|(key, w)| **w > 0.0 && b.get(*key).is_some_and(|v| *v > 0.0))
        .count();
    let union = members_a + members_b - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

// =============================================================================
// Lookup seam
// =============================================================================

/// Source of pairwise similarities for neighbour search.
///
/// A plain [`SimilarityMetric`] computes every pair live; a
/// [`SimilarityMatrix`] answers from precomputed values.
pub trait SimilarityLookup: Send + Sync {
    fn similarity(&self, a_id: &str, a: &SparseVector, b_id: &str, b: &SparseVector) -> f64;
}

impl SimilarityLookup for SimilarityMetric {
    fn similarity(&self, _a_id: &str, a: &SparseVector, _b_id: &str, b: &SparseVector) -> f64 {
        self.compute(a, b)
    }
}

/// Precomputed, caller-owned pairwise similarities for one set of rows.
///
/// Only positive similarities are stored. A pair of known ids with no entry
/// has similarity 0.0; a pair involving an unknown id is computed live with
/// the matrix's metric.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    metric: SimilarityMetric,
    /// Known ids with their self-similarity (0.0 for zero-magnitude rows)
    ids: BTreeMap<EntityId, f64>,
    scores: HashMap<(EntityId, EntityId), f64>,
}

impl SimilarityMatrix {
    /// Compute all pairwise similarities between `rows` in parallel
    pub fn compute(rows: &BTreeMap<EntityId, SparseVector>, metric: SimilarityMetric) -> Self {
        let owned: Vec<(&EntityId, &SparseVector)> = rows.iter().collect();
        let entries = &owned;
        let n = entries.len();

        let scores: HashMap<(EntityId, EntityId), f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(move |i| {
                (i + 1..n).filter_map(move |j| {
                    let (a_id, a) = entries[i];
                    let (b_id, b) = entries[j];
                    let sim = metric.compute(a, b);
                    (sim > 0.0).then(|| (pair_key(a_id, b_id), sim))
                })
            })
            .collect();

        debug!("Precomputed {} positive similarities over {} rows", scores.len(), n);

        Self {
            metric,
            ids: rows
                .iter()
                .map(|(id, row)| (id.clone(), metric.compute(row, row)))
                .collect(),
            scores,
        }
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Stored similarity of a pair of known ids (order does not matter)
    pub fn get(&self, a_id: &str, b_id: &str) -> Option<f64> {
        let self_similarity = *self.ids.get(a_id)?;
        if !self.ids.contains_key(b_id) {
            return None;
        }
        if a_id == b_id {
            return Some(self_similarity);
        }
        Some(
            self.scores
                .get(&pair_key(a_id, b_id))
                .copied()
                .unwrap_or(0.0),
        )
    }

    /// Number of stored positive pairs
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl SimilarityLookup for SimilarityMatrix {
    fn similarity(&self, a_id: &str, a: &SparseVector, b_id: &str, b: &SparseVector) -> f64 {
        self.get(a_id, b_id)
            .unwrap_or_else(|| self.metric.compute(a, b))
    }
}

fn pair_key(a: &str, b: &str) -> (EntityId, EntityId) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// =============================================================================
// Neighbour search
// =============================================================================

/// One entry of a neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: EntityId,
    pub similarity: f64,
}

/// Top-k most similar candidates to `target`
///
/// Candidates with similarity <= 0 are dropped. Ordering is similarity
/// descending, ties broken by id ascending.
pub fn neighbors<'a, I>(
    target: &SparseVector,
    candidates: I,
    k: usize,
    metric: SimilarityMetric,
) -> Vec<Neighbor>
where
    I: IntoIterator<Item = (&'a EntityId, &'a SparseVector)>,
{
    rank_neighbors(candidates, k, |_, vector| metric.compute(target, vector))
}

/// Same as [`neighbors`], resolving each pair through `lookup`
pub fn neighbors_with<'a, I, L>(
    target_id: &str,
    target: &SparseVector,
    candidates: I,
    k: usize,
    lookup: &L,
) -> Vec<Neighbor>
where
    I: IntoIterator<Item = (&'a EntityId, &'a SparseVector)>,
    L: SimilarityLookup + ?Sized,
{
    rank_neighbors(candidates, k, |id, vector| {
        lookup.similarity(target_id, target, id, vector)
    })
}

fn rank_neighbors<'a, I, F>(candidates: I, k: usize, score: F) -> Vec<Neighbor>
where
    I: IntoIterator<Item = (&'a EntityId, &'a SparseVector)>,
    F: Fn(&EntityId, &SparseVector) -> f64 + Sync,
{
    if k == 0 {
        return Vec::new();
    }

    let candidates: Vec<(&EntityId, &SparseVector)> = candidates.into_iter().collect();

    let mut ranked: Vec<Neighbor> = candidates
        .par_iter()
        .filter_map(|&(id, vector)| {
            let similarity = score(id, vector);
            (similarity > 0.0).then(|| Neighbor {
                id: id.clone(),
                similarity,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(k);
    ranked
}
