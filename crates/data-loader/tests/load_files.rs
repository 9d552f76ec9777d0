//! Loading datasets from files on disk.

use data_loader::{DataLoadError, Dataset, DuplicatePolicy};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const INTERACTIONS: &str = "\
# actor::target::score[::timestamp]
u1::i1::5::978300760
u1::i2::3
u2::i1::4
u2::i2::5::978302109
u2::i3::2

u1::i1::3
";

const FEATURES: &str = "\
i1::action|sci-fi
i2::action=0.5|drama
u1::noir
";

fn write_files(dir: &TempDir, interactions: &str, features: &str) -> (PathBuf, PathBuf) {
    let interactions_path = dir.path().join("interactions.dat");
    let features_path = dir.path().join("features.dat");
    fs::write(&interactions_path, interactions).unwrap();
    fs::write(&features_path, features).unwrap();
    (interactions_path, features_path)
}

#[test]
fn test_load_both_files() {
    let dir = TempDir::new().unwrap();
    let (interactions, features) = write_files(&dir, INTERACTIONS, FEATURES);

    let dataset = Dataset::load_from_files(
        &interactions,
        Some(&features),
        DuplicatePolicy::LastWriteWins,
        5.0,
    )
    .unwrap();

    // (u1, i1) appears twice and is stored once
    assert_eq!(dataset.ratings.counts(), (2, 3, 5));
    assert_eq!(dataset.ratings.score("u1", "i1"), Some(3.0));
    assert_eq!(dataset.ratings.score("u2", "i3"), Some(2.0));

    assert_eq!(dataset.features.len(), 3);
    let i2 = dataset.features.get("i2").unwrap();
    assert_eq!(i2["action"], 0.5);
    assert_eq!(i2["drama"], 1.0);
}

#[test]
fn test_load_averages_duplicates() {
    let dir = TempDir::new().unwrap();
    let (interactions, _) = write_files(&dir, INTERACTIONS, FEATURES);

    let dataset =
        Dataset::load_from_files(&interactions, None, DuplicatePolicy::Average, 5.0).unwrap();

    assert_eq!(dataset.ratings.score("u1", "i1"), Some(4.0));
    assert_eq!(dataset.ratings.get_target_vector("i1").unwrap()["u1"], 4.0);
    assert!(dataset.features.is_empty());
}

#[test]
fn test_load_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let (interactions, features) = write_files(&dir, INTERACTIONS, FEATURES);

    let result =
        Dataset::load_from_files(&interactions, Some(&features), DuplicatePolicy::Reject, 5.0);

    match result {
        Err(DataLoadError::DuplicateInteraction { actor, target }) => {
            assert_eq!(actor, "u1");
            assert_eq!(target, "i1");
        }
        Err(other) => panic!("expected duplicate error, got {}", other),
        Ok(_) => panic!("expected duplicate error"),
    }
}

#[test]
fn test_load_score_above_scale() {
    let dir = TempDir::new().unwrap();
    let (interactions, features) = write_files(&dir, "u1::i1::4\nu1::i2::6\n", FEATURES);

    let result = Dataset::load_from_files(
        &interactions,
        Some(&features),
        DuplicatePolicy::default(),
        5.0,
    );
    assert!(matches!(result, Err(DataLoadError::ValidationError(_))));

    // Same file under a wider scale
    let dataset =
        Dataset::load_from_files(&interactions, None, DuplicatePolicy::default(), 10.0).unwrap();
    assert_eq!(dataset.ratings.score("u1", "i2"), Some(6.0));
}

#[test]
fn test_load_reports_bad_feature_line() {
    let dir = TempDir::new().unwrap();
    let (interactions, features) = write_files(&dir, INTERACTIONS, "i1::action\ni2 drama\n");

    let result = Dataset::load_from_files(
        &interactions,
        Some(&features),
        DuplicatePolicy::default(),
        5.0,
    );
    assert!(matches!(
        result,
        Err(DataLoadError::ParseError { line: 2, .. })
    ));
}
