//! Storage traits and error types
//!
//! This module defines the trait interface for page store backends and
//! associated error types.

use crate::storage::{AppendOutcome, PageRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during page store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Corrupt store file {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for page store implementations
///
/// A store keeps one ordered list of `PageRecord`s per site. Implementations
/// must be safe to call from many workers at once: appends to the same site
/// are serialized internally so no read-modify-write cycle is lost.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Appends a record to the store of the record's site
    ///
    /// # Returns
    ///
    /// * `Ok(AppendOutcome::Appended)` - The record was written
    /// * `Ok(AppendOutcome::Duplicate)` - A record with identical content
    ///   already exists and the store deduplicates by content
    /// * `Err(StoreError)` - The store could not be read or written
    async fn append(&self, record: PageRecord) -> StoreResult<AppendOutcome>;

    /// Reads every record stored for the site with the given store name
    ///
    /// A site that has never been written to yields an empty list.
    async fn read_site(&self, site: &str) -> StoreResult<Vec<PageRecord>>;

    /// Lists the names of all sites that have a store
    async fn list_sites(&self) -> StoreResult<Vec<String>>;
}
