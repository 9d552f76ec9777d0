//! Filter to drop recommendations below a blended-score floor.

use crate::traits::Filter;
use anyhow::Result;
use scoring::{ActorContext, Recommendation};

/// Keeps recommendations whose blended score is at least `min_score`.
pub struct MinimumScoreFilter {
    min_score: f64,
}

impl MinimumScoreFilter {
    pub fn new(min_score: f64) -> Self {
        Self { min_score }
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }
}

impl Filter for MinimumScoreFilter {
    fn name(&self) -> &str {
        "MinimumScoreFilter"
    }

    fn apply(
        &self,
        recommendations: Vec<Recommendation>,
        _context: &ActorContext,
    ) -> Result<Vec<Recommendation>> {
        let filtered: Vec<Recommendation> = recommendations
            .into_iter()
            .filter(|rec| rec.blended_score >= self.min_score)
            .collect();

        tracing::trace!("MinimumScoreFilter kept {} entries", filtered.len());
        Ok(filtered)
    }
}
