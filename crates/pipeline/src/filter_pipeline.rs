//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use anyhow::{Context, Result};
use scoring::{ActorContext, Recommendation};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ZeroEvidenceFilter)
///     .add_filter(MinimumScoreFilter::new(0.2));
///
/// let filtered = pipeline.apply(recommendations, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    ///
    /// Stops at the first failing filter; the error names it.
    pub fn apply(
        &self,
        recommendations: Vec<Recommendation>,
        context: &ActorContext,
    ) -> Result<Vec<Recommendation>> {
        let mut current = recommendations;
        for filter in &self.filters {
            let before = current.len();
            current = filter
                .apply(current, context)
                .with_context(|| format!("Filter {} failed", filter.name()))?;
            tracing::debug!(
                "Applied filter {} ({} -> {})",
                filter.name(),
                before,
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{MinimumScoreFilter, ZeroEvidenceFilter};
    use scoring::SourceBreakdown;

    fn rec(id: &str, collaborative: f64, content: f64) -> Recommendation {
        Recommendation {
            candidate_id: id.to_string(),
            blended_score: collaborative + content,
            breakdown: SourceBreakdown {
                collaborative,
                content,
            },
        }
    }

    struct FailingFilter;

    impl Filter for FailingFilter {
        fn name(&self) -> &str {
            "FailingFilter"
        }

        fn apply(
            &self,
            _recommendations: Vec<Recommendation>,
            _context: &ActorContext,
        ) -> Result<Vec<Recommendation>> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = ActorContext::new("u1");

        let recs = vec![rec("i1", 0.9, 0.0), rec("i2", 0.0, 0.0)];
        let filtered = pipeline.apply(recs.clone(), &context).unwrap();
        assert_eq!(filtered, recs);
    }

    #[test]
    fn test_chained_filters() {
        let context = ActorContext::new("u1");
        let pipeline = FilterPipeline::new()
            .add_filter(ZeroEvidenceFilter)
            .add_filter(MinimumScoreFilter::new(0.5));
        assert_eq!(pipeline.len(), 2);

        let recs = vec![rec("i1", 0.6, 0.3), rec("i2", 0.2, 0.1), rec("i3", 0.0, 0.0)];
        let filtered = pipeline.apply(recs, &context).unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].candidate_id, "i1");
    }

    #[test]
    fn test_error_names_filter() {
        let context = ActorContext::new("u1");
        let pipeline = FilterPipeline::new().add_filter(FailingFilter);

        let err = pipeline.apply(vec![rec("i1", 1.0, 0.0)], &context).unwrap_err();
        assert!(err.to_string().contains("FailingFilter"));
    }
}
