//! Filter implementations for ranked recommendations.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_interacted;
pub mod minimum_score;
pub mod zero_evidence;

// Re-export for convenience
pub use already_interacted::AlreadyInteractedFilter;
pub use minimum_score::MinimumScoreFilter;
pub use zero_evidence::ZeroEvidenceFilter;
