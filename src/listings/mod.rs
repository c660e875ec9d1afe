//! Listing corpus loading
//!
//! The corpus is a static JSON file read once at startup: either a bare
//! array of listing objects, or an object wrapping that array under a
//! named key (the shipped dataset nests listings under a company key).

pub mod normalizer;

pub use normalizer::normalize;

use crate::errors::{AssistantError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// One raw listing record: field name to JSON value, never mutated
/// after load. Missing fields are data, not errors.
pub type ListingRecord = serde_json::Map<String, Value>;

/// Load the listing corpus from a JSON file.
///
/// `key` selects the wrapping key when the file is an object; when
/// unset, the first array-valued entry is used.
///
/// # Errors
/// - File cannot be read or is not valid JSON
/// - No listing array found under the expected shape
/// - An array entry is not a JSON object
pub fn load_listings(path: &Path, key: Option<&str>) -> Result<Vec<ListingRecord>> {
    let contents = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&contents)?;

    let entries = match data {
        Value::Array(entries) => entries,
        Value::Object(map) => match key {
            Some(key) => match map.get(key) {
                Some(Value::Array(entries)) => entries.clone(),
                Some(_) => {
                    return Err(AssistantError::DatasetError(format!(
                        "dataset key {key:?} is not an array"
                    )))
                }
                None => {
                    return Err(AssistantError::DatasetError(format!(
                        "dataset key {key:?} not found in {}",
                        path.display()
                    )))
                }
            },
            None => map
                .into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(entries) => Some(entries),
                    _ => None,
                })
                .ok_or_else(|| {
                    AssistantError::DatasetError(format!(
                        "no listing array found in {}",
                        path.display()
                    ))
                })?,
        },
        _ => {
            return Err(AssistantError::DatasetError(format!(
                "{} is neither an array nor an object",
                path.display()
            )))
        }
    };

    let records = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Object(record) => Ok(record),
            other => Err(AssistantError::DatasetError(format!(
                "listing {i} is not an object (found {other})"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    info!("loaded {} listings from {}", records.len(), path.display());

    Ok(records)
}
