//! Filter to remove targets the actor has already interacted with.
//!
//! The blender excludes history by default. This filter covers blenders
//! built with `with_exclusion(false)`, where history is scored first and
//! dropped later (for example to inspect how seen items would rank).

use crate::traits::Filter;
use anyhow::Result;
use scoring::{ActorContext, Recommendation};

/// Removes recommendations whose target appears in the actor's history.
pub struct AlreadyInteractedFilter;

impl Filter for AlreadyInteractedFilter {
    fn name(&self) -> &str {
        "AlreadyInteractedFilter"
    }

    fn apply(
        &self,
        recommendations: Vec<Recommendation>,
        context: &ActorContext,
    ) -> Result<Vec<Recommendation>> {
        let filtered: Vec<Recommendation> = recommendations
            .into_iter()
            .filter(|rec| !context.interacted.contains(&rec.candidate_id))
            .collect();
        Ok(filtered)
    }
}
