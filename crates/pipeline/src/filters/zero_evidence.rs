//! Filter to drop recommendations neither signal supports.
//!
//! Cold-start actors and unrated, untagged candidates come back from the
//! blender with a 0.0 score. Callers that would rather show nothing than
//! an arbitrary id-ordered list put this filter first.

use crate::traits::Filter;
use anyhow::Result;
use scoring::{ActorContext, Recommendation};

/// Removes recommendations whose collaborative and content scores are both zero.
pub struct ZeroEvidenceFilter;

impl Filter for ZeroEvidenceFilter {
    fn name(&self) -> &str {
        "ZeroEvidenceFilter"
    }

    fn apply(
        &self,
        recommendations: Vec<Recommendation>,
        context: &ActorContext,
    ) -> Result<Vec<Recommendation>> {
        let before = recommendations.len();
        let filtered: Vec<Recommendation> = recommendations
            .into_iter()
            .filter(|rec| rec.breakdown.has_evidence())
            .collect();

        if filtered.len() < before {
            tracing::debug!(
                "Dropped {} zero-evidence entries for actor {}",
                before - filtered.len(),
                context.actor_id
            );
        }
        Ok(filtered)
    }
}
