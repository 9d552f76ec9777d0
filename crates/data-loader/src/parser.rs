//! Parser for interaction and feature data files.
//!
//! Both formats are line oriented and `::` delimited:
//! - interactions: `actorId::targetId::score[::timestamp]`
//! - features:     `entityId::tag[=weight]|tag[=weight]|...`
//!
//! Empty lines and lines starting with `#` are skipped. A tag without an
//! explicit weight has weight 1.0; a tag repeated on one line accumulates.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::path::Path;

/// Read a whole file, mapping a missing file to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Iterate over meaningful lines with their 1-based line numbers
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_weight(raw: &str, file: &str, line: usize, what: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", what, e),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(DataLoadError::InvalidValue {
            field: what.to_string(),
            value: raw.trim().to_string(),
        });
    }
    Ok(value)
}

fn non_empty_id<'a>(raw: &'a str, file: &str, line: usize, what: &str) -> Result<&'a str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Missing {}", what),
        });
    }
    Ok(id)
}

/// Parse the interactions file
pub fn parse_interactions(path: &Path) -> Result<Vec<Interaction>> {
    let content = read_file(path)?;
    parse_interactions_str(&content, &file_label(path))
}

/// Parse interaction rows from in-memory content
///
/// `file` is only used to label errors.
pub fn parse_interactions_str(content: &str, file: &str) -> Result<Vec<Interaction>> {
    let mut interactions = Vec::new();

    for (line_no, line) in data_lines(content) {
        let parts: Vec<&str> = line.split("::").collect();
        // A trailing timestamp column is tolerated and ignored
        if parts.len() != 3 && parts.len() != 4 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: "3 or 4".to_string(),
                found: parts.len(),
                line: line_no,
            });
        }

        let actor_id = non_empty_id(parts[0], file, line_no, "actorId")?;
        let target_id = non_empty_id(parts[1], file, line_no, "targetId")?;
        let score = parse_weight(parts[2], file, line_no, "score")?;

        interactions.push(Interaction::new(actor_id, target_id, score));
    }

    Ok(interactions)
}

/// Parse the features file
pub fn parse_features(path: &Path) -> Result<FeatureStore> {
    let content = read_file(path)?;
    parse_features_str(&content, &file_label(path))
}

/// Parse feature rows from in-memory content
///
/// A later line for the same entity replaces the earlier one.
pub fn parse_features_str(content: &str, file: &str) -> Result<FeatureStore> {
    let mut store = FeatureStore::new();

    for (line_no, line) in data_lines(content) {
        let (entity, tags) = line.split_once("::").ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing tag list".to_string(),
        })?;

        let entity_id = non_empty_id(entity, file, line_no, "entityId")?;
        let features = parse_tag_list(tags, file, line_no)?;
        store.insert(entity_id, features);
    }

    Ok(store)
}

/// Parse a pipe-separated tag list
///
/// Example: "action|sci-fi=0.5" -> {"action": 1.0, "sci-fi": 0.5}
fn parse_tag_list(s: &str, file: &str, line: usize) -> Result<FeatureVector> {
    let mut features = FeatureVector::new();
    for raw in s.split('|').map(str::trim).filter(|t| !t.is_empty()) {
        let (tag, weight) = match raw.split_once('=') {
            Some((tag, weight)) => (tag.trim(), parse_weight(weight, file, line, "tag weight")?),
            None => (raw, 1.0),
        };
        if tag.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: format!("Empty tag name in '{}'", raw),
            });
        }
        *features.entry(tag.to_string()).or_insert(0.0) += weight;
    }
    Ok(features)
}
