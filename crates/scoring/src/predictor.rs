//! Predictor - Neighbourhood Collaborative Filtering
//!
//! Predicts how strongly an actor would score a candidate from the scores of
//! similar entities.
//!
//! ## Algorithm
//! 1. Pick the axis: rows are actors (user-based) or targets (item-based)
//! 2. Find the top-k rows most similar to the row being predicted for
//! 3. Average the neighbours' recorded values in the column being predicted,
//!    weighting each by its similarity
//! 4. No neighbour has a value there -> 0.0 ("no evidence")
//!
//! User-based and item-based prediction are the same routine with the roles
//! of actor and target swapped:
//!
//! | axis       | rows       | row      | column    |
//! |------------|------------|----------|-----------|
//! | UserBased  | by actor   | actor    | candidate |
//! | ItemBased  | by target  | candidate| actor     |

use crate::similarity::{neighbors_with, Neighbor, SimilarityLookup, SimilarityMetric};
use data_loader::{EntityId, RatingMatrix, SparseVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Which axis of the rating matrix neighbourhoods are formed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Neighbours are actors with similar rating rows
    #[default]
    UserBased,
    /// Neighbours are targets rated similarly by the same actors
    ItemBased,
}

/// Which rows are eligible to become neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPool {
    /// Top-k over every other row; neighbours without a value for the
    /// predicted column simply contribute nothing
    #[default]
    All,
    /// Top-k over the rows that have a value for the predicted column
    RatersOfCandidate,
}

/// Neighbourhood predictor over a [`RatingMatrix`]
#[derive(Debug, Clone)]
pub struct Predictor {
    /// Neighbourhood size
    k: usize,

    metric: SimilarityMetric,

    axis: Axis,

    pool: NeighborPool,
}

impl Predictor {
    /// Create a predictor with neighbourhood size `k`
    ///
    /// Defaults: cosine similarity, user-based, all rows eligible.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: SimilarityMetric::Cosine,
            axis: Axis::UserBased,
            pool: NeighborPool::All,
        }
    }

    /// Configure the similarity measure (default: cosine)
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Configure the axis (default: user-based)
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Configure which rows may become neighbours (default: all)
    pub fn with_neighbor_pool(mut self, pool: NeighborPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Predicted score of `actor` for `candidate`, in the rating scale
    pub fn predict(&self, actor: &str, candidate: &str, ratings: &RatingMatrix) -> f64 {
        self.predict_with(actor, candidate, ratings, &self.metric)
    }

    /// Same as [`Predictor::predict`], resolving similarities through `lookup`
    #[instrument(skip(self, ratings, lookup), fields(axis = ?self.axis, k = self.k))]
    pub fn predict_with<L>(
        &self,
        actor: &str,
        candidate: &str,
        ratings: &RatingMatrix,
        lookup: &L,
    ) -> f64
    where
        L: SimilarityLookup + ?Sized,
    {
        let (rows, row_id, column_id) = self.orient(actor, candidate, ratings);
        let neighborhood = self.neighborhood(rows, row_id, column_id, lookup);
        let prediction = weighted_average(rows, &neighborhood, column_id);

        debug!(
            "Predicted {:.4} from {} neighbours",
            prediction,
            neighborhood.len()
        );
        prediction
    }

    /// Predict one actor's score for many candidates
    ///
    /// Output order matches `candidates`. When the neighbourhood does not
    /// depend on the candidate (user-based over all rows) it is built once.
    pub fn predict_many<L>(
        &self,
        actor: &str,
        candidates: &[&str],
        ratings: &RatingMatrix,
        lookup: &L,
    ) -> Vec<f64>
    where
        L: SimilarityLookup + ?Sized,
    {
        match (self.axis, self.pool) {
            (Axis::UserBased, NeighborPool::All) => {
                let rows = ratings.actor_rows();
                let neighborhood = self.neighborhood(rows, actor, "", lookup);
                debug!(
                    "Shared neighbourhood of {} actors for {} candidates",
                    neighborhood.len(),
                    candidates.len()
                );
                candidates
                    .par_iter()
                    .map(|candidate| weighted_average(rows, &neighborhood, candidate))
                    .collect()
            }
            _ => candidates
                .par_iter()
                .map(|candidate| self.predict_with(actor, candidate, ratings, lookup))
                .collect(),
        }
    }

    /// Rows, row id and column id for the configured axis
    fn orient<'a>(
        &self,
        actor: &'a str,
        candidate: &'a str,
        ratings: &'a RatingMatrix,
    ) -> (&'a BTreeMap<EntityId, SparseVector>, &'a str, &'a str) {
        match self.axis {
            Axis::UserBased => (ratings.actor_rows(), actor, candidate),
            Axis::ItemBased => (ratings.target_rows(), candidate, actor),
        }
    }

    /// Top-k rows most similar to `row_id`, excluding the row itself
    fn neighborhood<L>(
        &self,
        rows: &BTreeMap<EntityId, SparseVector>,
        row_id: &str,
        column_id: &str,
        lookup: &L,
    ) -> Vec<Neighbor>
    where
        L: SimilarityLookup + ?Sized,
    {
        let Some(row) = rows.get(row_id) else {
            return Vec::new();
        };

        let pool = self.pool;
        let eligible = rows.iter().filter(|(id, other)| {
            id.as_str() != row_id
                && match pool {
                    NeighborPool::All => true,
                    NeighborPool::RatersOfCandidate => other.contains_key(column_id),
                }
        });

        neighbors_with(row_id, row, eligible, self.k, lookup)
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Similarity-weighted average of the neighbours' values in `column_id`
///
/// Neighbours without a value are skipped. 0.0 when none has one.
fn weighted_average(
    rows: &BTreeMap<EntityId, SparseVector>,
    neighborhood: &[Neighbor],
    column_id: &str,
) -> f64 {
    let (weighted_sum, weight_total) = neighborhood
        .iter()
        .filter_map(|neighbor| {
            let value = rows.get(&neighbor.id)?.get(column_id)?;
            Some((neighbor.similarity * value, neighbor.similarity))
        })
        .fold((0.0, 0.0), |(sum, total), (v, w)| (sum + v, total + w));

    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

/// Predicted score of `actor` for `candidate` using a user-based cosine
/// neighbourhood of size `k`
pub fn predict(actor: &str, candidate: &str, interactions: &RatingMatrix, k: usize) -> f64 {
    Predictor::new(k).predict(actor, candidate, interactions)
}
