//! Visited set shared by the workers of one crawl run

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Normalized URLs that have already been claimed for fetching
///
/// Created fresh for every submitted batch and dropped when the run ends.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `normalized_url` as visited
    ///
    /// Returns true if this call was the first to mark it. The check and the
    /// insert happen under one lock acquisition.
    pub fn test_and_mark(&self, normalized_url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalized_url.to_string())
    }

    /// Returns true if the URL has already been marked
    pub fn contains(&self, normalized_url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(normalized_url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
