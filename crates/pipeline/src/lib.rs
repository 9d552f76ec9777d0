//! Post-ranking filters for hybrid recommendations.
//!
//! This crate provides:
//! - Filter trait and implementations over ranked recommendations
//! - FilterPipeline for composing filters
//!
//! Filters run after the blender has ranked and truncated, so they only
//! ever remove entries. The relative order the blender produced survives.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(ZeroEvidenceFilter)
//!     .add_filter(MinimumScoreFilter::new(0.1));
//!
//! let context = scoring::build_actor_context(&dataset, "u1");
//! let filtered = pipeline.apply(recs, &context)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
