//! Output module for crawl summaries and store reports
//!
//! This module handles:
//! - Counting page outcomes while a run is in progress
//! - The `CrawlSummary` returned when a run completes
//! - Per-site store statistics for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counts of one finished crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Number of seeds submitted
    pub seeds: usize,

    /// Records appended to a page store
    pub pages_stored: u64,

    /// Pages skipped because identical content was already stored
    pub duplicates_skipped: u64,

    /// URLs whose fetch or render failed
    pub fetch_failures: u64,

    /// Pages whose record could not be written
    pub store_failures: u64,

    /// Tasks that panicked and were contained
    pub worker_panics: u64,

    /// Frontier entries discarded because the URL was already visited
    pub already_visited: u64,

    /// Whether the run stopped on cancellation or its deadline
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Total number of URLs that went through the fetch pipeline
    pub fn pages_attempted(&self) -> u64 {
        self.pages_stored
            + self.duplicates_skipped
            + self.fetch_failures
            + self.store_failures
            + self.worker_panics
    }
}

/// Live counters updated by the workers of a run
#[derive(Debug, Default)]
pub struct RunCounters {
    pub pages_stored: AtomicU64,
    pub duplicates_skipped: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub store_failures: AtomicU64,
    pub worker_panics: AtomicU64,
    pub already_visited: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to a counter
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a summary
    pub fn summarize(
        &self,
        seeds: usize,
        started_at: DateTime<Utc>,
        cancelled: bool,
    ) -> CrawlSummary {
        CrawlSummary {
            seeds,
            pages_stored: self.pages_stored.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            worker_panics: self.worker_panics.load(Ordering::Relaxed),
            already_visited: self.already_visited.load(Ordering::Relaxed),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!(
        "Status: {}",
        if summary.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    );
    println!("Started:  {}", summary.started_at.to_rfc3339());
    println!("Finished: {}", summary.finished_at.to_rfc3339());
    println!("Duration: {}s", summary.duration_seconds());
    println!();
    println!("Seeds:              {}", summary.seeds);
    println!("Pages stored:       {}", summary.pages_stored);
    println!("Duplicates skipped: {}", summary.duplicates_skipped);
    println!("Already visited:    {}", summary.already_visited);
    println!("Fetch failures:     {}", summary.fetch_failures);
    println!("Store failures:     {}", summary.store_failures);
    println!("Worker panics:      {}", summary.worker_panics);
}
