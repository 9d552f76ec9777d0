//! Scoring configuration.
//!
//! Every knob of the predictor and blender in one serde struct, so a whole
//! blend configuration can be stored as JSON and reproduced. Missing fields
//! fall back to the builder defaults.
//!
//! ```json
//! {
//!   "k": 30,
//!   "axis": "item_based",
//!   "weights": { "collaborative": 0.7, "content": 0.3 },
//!   "duplicate_policy": "average"
//! }
//! ```

use crate::blender::{BlendWeights, HybridBlender};
use crate::error::{Result, ScoringError};
use crate::predictor::{Axis, NeighborPool, Predictor};
use crate::similarity::SimilarityMetric;
use data_loader::{Dataset, DuplicatePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Neighbourhood size
    pub k: usize,
    pub axis: Axis,
    pub metric: SimilarityMetric,
    pub neighbor_pool: NeighborPool,
    /// Top of the rating scale
    pub max_score: f64,
    pub duplicate_policy: DuplicatePolicy,
    pub exclude_interacted: bool,
    pub weights: BlendWeights,
    pub top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            k: 20,
            axis: Axis::default(),
            metric: SimilarityMetric::default(),
            neighbor_pool: NeighborPool::default(),
            max_score: 5.0,
            duplicate_policy: DuplicatePolicy::default(),
            exclude_interacted: true,
            weights: BlendWeights::default(),
            top_n: 10,
        }
    }
}

impl ScoringConfig {
    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_error = |reason: String| ScoringError::Config {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| config_error(e.to_string()))?;
        config.validate()?;

        tracing::debug!("Loaded scoring config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            return Err(ScoringError::InvalidArgument(format!(
                "max_score must be a positive number, got {}",
                self.max_score
            )));
        }
        Ok(())
    }

    pub fn build_predictor(&self) -> Predictor {
        Predictor::new(self.k)
            .with_axis(self.axis)
            .with_metric(self.metric)
            .with_neighbor_pool(self.neighbor_pool)
    }

    pub fn build_blender(&self) -> HybridBlender {
        HybridBlender::new(self.build_predictor())
            .with_max_score(self.max_score)
            .with_exclusion(self.exclude_interacted)
    }

    /// Load a dataset with this config's duplicate policy and score range
    pub fn load_dataset(&self, interactions: &Path, features: Option<&Path>) -> Result<Dataset> {
        Ok(Dataset::load_from_files(
            interactions,
            features,
            self.duplicate_policy,
            self.max_score,
        )?)
    }
}
