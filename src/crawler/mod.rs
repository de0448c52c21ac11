//! Crawler module for page fetching and processing
//!
//! This module contains the crawl engine, including:
//! - Page rendering over HTTP or a headless browser
//! - Text and title extraction
//! - Same-site link extraction
//! - The shared frontier and visited set
//! - The worker pool and crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod visited;

pub use coordinator::{Coordinator, CrawlHandle};
pub use extractor::{clean_text, extract, ExtractedContent};
#[cfg(feature = "browser")]
pub use fetcher::BrowserRenderer;
pub use fetcher::{build_http_client, build_renderer, HttpRenderer, PageRenderer, RenderedPage};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_internal_links;
pub use scheduler::Scheduler;
pub use visited::VisitedSet;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::SiteGrabError;

/// Runs a complete crawl of `seeds` with the given configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run reached `Done`
/// * `Err(SiteGrabError)` - The run could not start
pub async fn crawl(config: Config, seeds: Vec<String>) -> Result<CrawlSummary, SiteGrabError> {
    Coordinator::new(config)?.crawl(seeds).await
}
