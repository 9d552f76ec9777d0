//! RatingMatrix building and dataset loading.
//!
//! Raw interaction rows become two indices (per actor, per target) under a
//! duplicate policy. Loading from disk parses both data files in parallel.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::BTreeMap;
use std::path::Path;

impl RatingMatrix {
    /// Build the matrix from interaction rows
    ///
    /// Repeated (actor, target) rows are resolved by `policy`. Scores are not
    /// range checked here; see [`RatingMatrix::validate`].
    pub fn from_interactions(interactions: &[Interaction], policy: DuplicatePolicy) -> Result<Self> {
        // (sum, count) per cell so `Average` can be resolved in one pass
        let mut cells: BTreeMap<EntityId, BTreeMap<EntityId, (f64, u32)>> = BTreeMap::new();

        for interaction in interactions {
            let row = cells.entry(interaction.actor_id.clone()).or_default();
            match row.get_mut(&interaction.target_id) {
                None => {
                    row.insert(interaction.target_id.clone(), (interaction.score, 1));
                }
                Some(cell) => match policy {
                    DuplicatePolicy::LastWriteWins => *cell = (interaction.score, 1),
                    DuplicatePolicy::Average => {
                        cell.0 += interaction.score;
                        cell.1 += 1;
                    }
                    DuplicatePolicy::Reject => {
                        return Err(DataLoadError::DuplicateInteraction {
                            actor: interaction.actor_id.clone(),
                            target: interaction.target_id.clone(),
                        });
                    }
                },
            }
        }

        let mut matrix = RatingMatrix::new();
        for (actor_id, row) in cells {
            let vector: SparseVector = row
                .into_iter()
                .map(|(target_id, (sum, count))| (target_id, sum / count as f64))
                .collect();

            for (target_id, &score) in &vector {
                matrix
                    .by_target
                    .entry(target_id.clone())
                    .or_default()
                    .insert(actor_id.clone(), score);
            }
            matrix.by_actor.insert(actor_id, vector);
        }

        Ok(matrix)
    }

    /// Validate data integrity
    ///
    /// Every score must be finite and within `0.0..=max_score`.
    pub fn validate(&self, max_score: f64) -> Result<()> {
        for (actor_id, row) in &self.by_actor {
            for (target_id, &score) in row {
                if !score.is_finite() || score < 0.0 || score > max_score {
                    return Err(DataLoadError::ValidationError(format!(
                        "score {} for ({}, {}) is outside 0..={}",
                        score, actor_id, target_id, max_score
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Dataset {
    /// Load interactions (and optionally features) from disk
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Build the rating matrix under `policy`
    /// 3. Validate scores against `max_score`
    pub fn load_from_files(
        interactions_path: &Path,
        features_path: Option<&Path>,
        policy: DuplicatePolicy,
        max_score: f64,
    ) -> Result<Self> {
        tracing::info!("Loading interactions from {:?}", interactions_path);

        let (interactions, features) = rayon::join(
            || parser::parse_interactions(interactions_path),
            || match features_path {
                Some(path) => parser::parse_features(path),
                None => Ok(FeatureStore::new()),
            },
        );
        let interactions = interactions?;
        let features = features?;

        let ratings = RatingMatrix::from_interactions(&interactions, policy)?;
        ratings.validate(max_score)?;

        let (actors, targets, cells) = ratings.counts();
        tracing::info!(
            "Loaded {} interaction rows ({} actors, {} targets, {} distinct pairs), {} feature vectors",
            interactions.len(),
            actors,
            targets,
            cells,
            features.len()
        );

        Ok(Dataset::new(ratings, features))
    }
}
