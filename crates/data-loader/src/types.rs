//! Core domain types for interaction and feature data.
//!
//! Everything here is entity-type agnostic: the same `EntityId` names users,
//! items, or anything else that interacts or carries features.
//!
//! Sparse vectors are `BTreeMap`s rather than `HashMap`s. Iteration order is
//! then fixed, so every float reduction over a vector happens in the same
//! order on every run and scores are reproducible bit for bit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque identifier for an actor or a target (user, item, ...)
///
/// Ordering is lexicographic and is the tie-break order for every ranking.
pub type EntityId = String;

/// Sparse mapping from a dimension key to a non-negative weight.
///
/// Keys that are absent are treated as zero, so two vectors never need
/// matching dimensionality.
pub type SparseVector = BTreeMap<String, f64>;

/// Tag/category weights attached to one entity
pub type FeatureVector = SparseVector;

// =============================================================================
// Interaction
// =============================================================================

/// A single recorded affinity of an actor towards a target
///
/// Interactions are immutable facts; the full set of them is the only input
/// to collaborative scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub actor_id: EntityId,
    pub target_id: EntityId,
    /// Bounded affinity, e.g. a 0-5 rating or an implicit signal in [0, 1]
    pub score: f64,
}

impl Interaction {
    pub fn new(actor_id: impl Into<EntityId>, target_id: impl Into<EntityId>, score: f64) -> Self {
        Self {
            actor_id: actor_id.into(),
            target_id: target_id.into(),
            score,
        }
    }
}

/// How repeated rows for the same (actor, target) pair are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The row that appears last in the input wins
    #[default]
    LastWriteWins,
    /// Repeated rows are averaged
    Average,
    /// Repeated rows are a data error
    Reject,
}

// =============================================================================
// RatingMatrix
// =============================================================================

/// Interactions indexed along both axes.
///
/// `by_actor[a][t]` and `by_target[t][a]` hold the same score. Rows keyed by
/// actor are what user-based prediction compares; rows keyed by target are
/// what item-based prediction compares.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    pub(crate) by_actor: BTreeMap<EntityId, SparseVector>,
    pub(crate) by_target: BTreeMap<EntityId, SparseVector>,
}

impl RatingMatrix {
    /// Creates a new, empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Rating vector of one actor (target id -> score)
    pub fn get_actor_vector(&self, actor_id: &str) -> Option<&SparseVector> {
        self.by_actor.get(actor_id)
    }

    /// Rating vector of one target (actor id -> score)
    pub fn get_target_vector(&self, target_id: &str) -> Option<&SparseVector> {
        self.by_target.get(target_id)
    }

    /// All actor rows
    pub fn actor_rows(&self) -> &BTreeMap<EntityId, SparseVector> {
        &self.by_actor
    }

    /// All target rows
    pub fn target_rows(&self) -> &BTreeMap<EntityId, SparseVector> {
        &self.by_target
    }

    /// Recorded score of `actor_id` for `target_id`, if any
    pub fn score(&self, actor_id: &str, target_id: &str) -> Option<f64> {
        self.by_actor.get(actor_id)?.get(target_id).copied()
    }

    /// Whether the actor has any recorded interaction with the target
    pub fn has_interacted(&self, actor_id: &str, target_id: &str) -> bool {
        self.score(actor_id, target_id).is_some()
    }

    /// Number of distinct (actors, targets, interactions)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total = self.by_actor.values().map(|v| v.len()).sum();
        (self.by_actor.len(), self.by_target.len(), total)
    }

    pub fn is_empty(&self) -> bool {
        self.by_actor.is_empty()
    }
}

// =============================================================================
// FeatureStore
// =============================================================================

/// Feature vectors per entity, as supplied by the caller's feature source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureStore {
    features: BTreeMap<EntityId, FeatureVector>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the feature vector of an entity
    pub fn insert(&mut self, entity_id: impl Into<EntityId>, features: FeatureVector) {
        self.features.insert(entity_id.into(), features);
    }

    pub fn get(&self, entity_id: &str) -> Option<&FeatureVector> {
        self.features.get(entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &FeatureVector)> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<(EntityId, FeatureVector)> for FeatureStore {
    fn from_iter<I: IntoIterator<Item = (EntityId, FeatureVector)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Everything a scoring request reads: interactions plus features
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub ratings: RatingMatrix,
    pub features: FeatureStore,
}

impl Dataset {
    pub fn new(ratings: RatingMatrix, features: FeatureStore) -> Self {
        Self { ratings, features }
    }
}
