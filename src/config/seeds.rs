//! Seed list files
//!
//! A seed list is a JSON document of the form `{"urls": ["https://..."]}`.

use crate::SiteGrabError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SeedList {
    urls: Vec<String>,
}

/// Reads the URLs of a seed list file
///
/// # Errors
///
/// Returns `SiteGrabError::SeedList` if the file cannot be read or is not a
/// valid seed list.
pub fn load_seed_list(path: &Path) -> Result<Vec<String>, SiteGrabError> {
    let seed_error = |message: String| SiteGrabError::SeedList {
        path: path.display().to_string(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
    let list: SeedList = serde_json::from_str(&content).map_err(|e| seed_error(e.to_string()))?;

    Ok(list
        .urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect())
}

/// Concatenates seed sources in order, dropping exact repeats
pub fn merge_seeds<'a>(sources: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    let mut seeds: Vec<String> = Vec::new();
    for seed in sources.into_iter().flatten() {
        if !seeds.contains(seed) {
            seeds.push(seed.clone());
        }
    }
    seeds
}
