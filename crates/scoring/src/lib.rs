//! # Scoring Crate
//!
//! Hybrid recommendation scoring over caller-supplied interactions and
//! features.
//!
//! ## Components
//!
//! ### Similarity Engine
//! Cosine and Jaccard similarity between sparse vectors, top-k neighbour
//! search, and an optional caller-owned [`SimilarityMatrix`] cache.
//!
//! ### Predictor
//! Similarity-weighted neighbourhood prediction, user-based or item-based
//! through one routine.
//!
//! ### Hybrid Blender
//! Weighted blend of normalized collaborative predictions and content
//! similarity, ranked by score then id.
//!
//! ## Example Usage
//!
//! ```ignore
//! use scoring::{BlendWeights, HybridBlender, Predictor};
//!
//! let blender = HybridBlender::new(Predictor::new(20)).with_max_score(5.0);
//! let recs = blender.recommend("u1", &pool, &dataset, BlendWeights::new(0.7, 0.3), 10)?;
//! ```
//!
//! ## Concurrency
//!
//! Everything is a pure function of its (borrowed, never mutated) inputs.
//! Per-candidate work fans out on rayon internally, but output order comes
//! from a deterministic sort, so identical inputs give identical output.
//! Independent `recommend` calls may run on separate threads.

pub mod error;
pub mod similarity;
pub mod predictor;
pub mod profile;
pub mod blender;
pub mod config;

pub use blender::{recommend, rank, BlendWeights, HybridBlender, Recommendation, SourceBreakdown};
pub use config::ScoringConfig;
pub use error::{Result, ScoringError};
pub use predictor::{predict, Axis, NeighborPool, Predictor};
pub use profile::{build_actor_context, build_actor_profile, ActorContext};
pub use similarity::{
    cosine, jaccard, neighbors, neighbors_with, similarity, Neighbor, SimilarityLookup,
    SimilarityMatrix, SimilarityMetric,
};
