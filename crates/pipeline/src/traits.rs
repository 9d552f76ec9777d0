//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to ranked recommendations.

use anyhow::Result;
use scoring::{ActorContext, Recommendation};

/// Core trait for filtering ranked recommendations.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across request threads
/// - Filters take ownership of the Vec and return the survivors
/// - Filters only remove entries; the relative order of what remains is kept
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a ranked list.
    ///
    /// # Arguments
    /// * `recommendations` - The ranked list to filter (takes ownership)
    /// * `context` - The actor the list was produced for
    fn apply(
        &self,
        recommendations: Vec<Recommendation>,
        context: &ActorContext,
    ) -> Result<Vec<Recommendation>>;
}
