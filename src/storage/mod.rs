//! Storage module for persisting extracted pages
//!
//! This module handles the durable side of a crawl:
//! - One JSON store file per site, named after the site's hostname
//! - Read-modify-write appends serialized per site
//! - Optional content-fingerprint deduplication

mod json;
mod traits;

pub use json::JsonPageStore;
pub use traits::{PageStore, StoreError, StoreResult};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One extracted page, as written to the site's store
///
/// Produced once per successfully fetched URL and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl PageRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// SHA-256 fingerprint of the cleaned content
    pub fn fingerprint(&self) -> String {
        content_fingerprint(&self.content)
    }
}

/// Result of appending a record to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was added to the store
    Appended,
    /// Identical content was already stored; nothing was written
    Duplicate,
}

/// Hex-encoded SHA-256 of a page's cleaned text
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
