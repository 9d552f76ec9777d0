//! # Data Loader Crate
//!
//! Loads and indexes the interaction and feature data that recommendation
//! scoring runs over.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Interaction, RatingMatrix, FeatureStore, Dataset)
//! - **parser**: Parse `::`-delimited data files into Rust structs
//! - **index**: Build the two-axis rating matrix under a duplicate policy
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, DuplicatePolicy};
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_files(
//!     Path::new("data/interactions.dat"),
//!     Some(Path::new("data/features.dat")),
//!     DuplicatePolicy::LastWriteWins,
//!     5.0,
//! )?;
//!
//! let row = dataset.ratings.get_actor_vector("u1");
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    EntityId,
    SparseVector,
    FeatureVector,
    // Core types
    Interaction,
    RatingMatrix,
    FeatureStore,
    Dataset,
    // Enums
    DuplicatePolicy,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix() {
        let matrix = RatingMatrix::new();
        assert_eq!(matrix.counts(), (0, 0, 0));
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_empty_queries() {
        let matrix = RatingMatrix::new();
        let store = FeatureStore::new();

        assert!(matrix.get_actor_vector("nobody").is_none());
        assert!(matrix.get_target_vector("nothing").is_none());
        assert!(!matrix.has_interacted("nobody", "nothing"));
        assert!(store.get("nothing").is_none());
    }

    #[test]
    fn test_feature_store_insert() {
        let mut store = FeatureStore::new();
        store.insert("i1", FeatureVector::from([("action".to_string(), 1.0)]));
        store.insert("i1", FeatureVector::from([("drama".to_string(), 1.0)]));

        assert_eq!(store.len(), 1);
        assert!(store.get("i1").unwrap().contains_key("drama"));
    }
}
