//! # Hybrid Blender
//!
//! Combines collaborative and content-based evidence into one ranked list:
//! 1. Build the actor context (interacted set, feature profile)
//! 2. Deduplicate the candidate pool and drop already-interacted candidates
//! 3. Collaborative score: neighbourhood prediction / max score, clamped to [0, 1]
//! 4. Content score: cosine(actor profile, candidate features)
//! 5. Blend with the caller's weights, rank, truncate to top-N
//!
//! Weights do not have to sum to 1. Blended scores are only comparable
//! between calls that use the same weights.
//!
//! An actor with no interactions and no feature history (cold start) gets
//! every candidate scored 0.0, which after the id tie-break means id order.

use crate::error::{Result, ScoringError};
use crate::predictor::Predictor;
use crate::profile::build_actor_context;
use crate::similarity::{cosine, SimilarityLookup};
use data_loader::{Dataset, EntityId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, instrument};

/// Caller-supplied weights for the two evidence sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub collaborative: f64,
    pub content: f64,
}

impl BlendWeights {
    pub fn new(collaborative: f64, content: f64) -> Self {
        Self {
            collaborative,
            content,
        }
    }

    /// Both weights must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("collaborative", self.collaborative), ("content", self.content)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidArgument(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// Per-source components of a blended score, both in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub collaborative: f64,
    pub content: f64,
}

impl SourceBreakdown {
    /// Whether either source produced any signal
    pub fn has_evidence(&self) -> bool {
        self.collaborative > 0.0 || self.content > 0.0
    }
}

/// One ranked output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub candidate_id: EntityId,
    pub blended_score: f64,
    pub breakdown: SourceBreakdown,
}

/// Sort by blended score descending, ties by candidate id ascending
pub fn rank(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        b.blended_score
            .total_cmp(&a.blended_score)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}

/// Hybrid collaborative + content scorer
#[derive(Debug, Clone)]
pub struct HybridBlender {
    predictor: Predictor,

    /// Top of the rating scale, used to normalize predictions
    max_score: f64,

    /// Drop candidates the actor already interacted with
    exclude_interacted: bool,
}

impl HybridBlender {
    /// Create a blender around `predictor`
    ///
    /// Defaults: max score 5.0, already-interacted candidates excluded.
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            max_score: 5.0,
            exclude_interacted: true,
        }
    }

    /// Configure the top of the rating scale (default: 5.0)
    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = max_score;
        self
    }

    /// Configure whether already-interacted candidates are dropped (default: true)
    pub fn with_exclusion(mut self, exclude: bool) -> Self {
        self.exclude_interacted = exclude;
        self
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Rank `candidate_pool` for `actor`
    pub fn recommend(
        &self,
        actor: &str,
        candidate_pool: &[EntityId],
        dataset: &Dataset,
        weights: BlendWeights,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        let metric = self.predictor.metric();
        self.recommend_with(actor, candidate_pool, dataset, weights, top_n, &metric)
    }

    /// Same as [`HybridBlender::recommend`], resolving collaborative
    /// similarities through `lookup` (e.g. a precomputed matrix)
    #[instrument(
        skip(self, candidate_pool, dataset, lookup),
        fields(pool = candidate_pool.len())
    )]
    pub fn recommend_with<L>(
        &self,
        actor: &str,
        candidate_pool: &[EntityId],
        dataset: &Dataset,
        weights: BlendWeights,
        top_n: usize,
        lookup: &L,
    ) -> Result<Vec<Recommendation>>
    where
        L: SimilarityLookup + ?Sized,
    {
        let start = Instant::now();

        weights.validate()?;
        if !self.max_score.is_finite() || self.max_score <= 0.0 {
            return Err(ScoringError::InvalidArgument(format!(
                "max score must be a positive number, got {}",
                self.max_score
            )));
        }

        let context = build_actor_context(dataset, actor);
        if context.is_cold_start() {
            debug!("Actor {} is cold start; all scores will be 0", actor);
        }

        // Deduplicated and id-ordered
        let candidates: Vec<&str> = candidate_pool
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .filter(|id| !(self.exclude_interacted && context.interacted.contains(*id)))
            .collect();

        debug!(
            "{} of {} pool entries remain after dedup/exclusion",
            candidates.len(),
            candidate_pool.len()
        );
        if candidates.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let predictions =
            self.predictor
                .predict_many(actor, &candidates, &dataset.ratings, lookup);

        let mut recommendations: Vec<Recommendation> = candidates
            .par_iter()
            .zip(predictions.par_iter())
            .map(|(&candidate_id, &predicted)| {
                let collaborative = (predicted / self.max_score).clamp(0.0, 1.0);
                let content = dataset
                    .features
                    .get(candidate_id)
                    .map(|features| cosine(&context.profile, features))
                    .unwrap_or(0.0);

                Recommendation {
                    candidate_id: candidate_id.to_string(),
                    blended_score: weights.collaborative * collaborative
                        + weights.content * content,
                    breakdown: SourceBreakdown {
                        collaborative,
                        content,
                    },
                }
            })
            .collect();

        rank(&mut recommendations);
        recommendations.truncate(top_n);

        debug!(
            "Selected {} recommendations in {:.2?}",
            recommendations.len(),
            start.elapsed()
        );
        Ok(recommendations)
    }
}

impl Default for HybridBlender {
    fn default() -> Self {
        Self::new(Predictor::default())
    }
}

/// Rank `candidate_pool` for `actor` with the default blender
/// (user-based cosine neighbourhood of 20, 0-5 scale, exclusion on)
pub fn recommend(
    actor: &str,
    candidate_pool: &[EntityId],
    dataset: &Dataset,
    collaborative_weight: f64,
    content_weight: f64,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    HybridBlender::default().recommend(
        actor,
        candidate_pool,
        dataset,
        BlendWeights::new(collaborative_weight, content_weight),
        top_n,
    )
}
