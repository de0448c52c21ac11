//! Scheduler driving one crawl run
//!
//! This module handles:
//! - A fixed pool of workers draining one shared frontier
//! - Atomic visited-set claims so each page is fetched at most once, keyed
//!   by its normalized URL
//! - The polite delay before every fetch
//! - Per-task panic containment
//! - Cancellation and the optional run deadline
//! - The `Idle -> Running -> Draining -> Done` state machine of the run

use crate::config::CrawlerConfig;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::PageRenderer;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::extract_internal_links;
use crate::crawler::visited::VisitedSet;
use crate::output::{CrawlSummary, RunCounters};
use crate::state::{CrawlState, StateCell};
use crate::storage::{AppendOutcome, PageRecord, PageStore};
use crate::url::{normalize_url, CrawlOrigin};
use crate::SiteGrabError;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs crawls over a renderer and a page store
///
/// A scheduler owns the state of exactly one run: `run` may be called once.
/// The frontier and visited set are created inside `run`, so separate
/// schedulers never share crawl state.
pub struct Scheduler {
    config: CrawlerConfig,
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn PageStore>,
    state: Arc<StateCell>,
}

/// Everything the workers of one run share
struct RunContext {
    frontier: Frontier,
    visited: VisitedSet,
    counters: RunCounters,
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn PageStore>,
    state: Arc<StateCell>,
    delay: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    /// Creates a new scheduler in the `Idle` state
    pub fn new(
        config: CrawlerConfig,
        renderer: Arc<dyn PageRenderer>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            config,
            renderer,
            store,
            state: Arc::new(StateCell::new()),
        }
    }

    /// Current state of the run
    pub fn state(&self) -> CrawlState {
        self.state.get()
    }

    /// Observes every state transition of the run
    pub fn subscribe(&self) -> watch::Receiver<CrawlState> {
        self.state.subscribe()
    }

    /// Crawls from `seeds` until the frontier drains or `cancel` fires
    ///
    /// All seeds share one visited set; each keeps its own origin. Page
    /// failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// Fails before any worker starts if no seeds were given, a seed is not
    /// a valid http(s) URL, or the scheduler has already run.
    pub async fn run(
        &self,
        seeds: &[String],
        cancel: CancellationToken,
    ) -> Result<CrawlSummary, SiteGrabError> {
        let started_at = Utc::now();

        if seeds.is_empty() {
            return Err(SiteGrabError::NoSeeds);
        }
        let origins = seeds
            .iter()
            .map(|seed| CrawlOrigin::from_seed(seed).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        self.state.advance(CrawlState::Running)?;

        let run_token = cancel.child_token();
        let ctx = Arc::new(RunContext {
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            counters: RunCounters::new(),
            renderer: Arc::clone(&self.renderer),
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            delay: self.config.request_delay(),
            cancel: run_token.clone(),
        });

        for (seed, origin) in seeds.iter().zip(origins) {
            ctx.frontier.push(FrontierEntry::new(seed.clone(), origin));
        }

        let deadline = self.config.deadline().map(|limit| {
            let token = run_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        tracing::warn!("Run deadline of {:?} reached, cancelling crawl", limit);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });

        let worker_count = self.config.worker_count.max(1) as usize;
        tracing::debug!("Starting {} workers", worker_count);

        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move { ctx.worker(id).await })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task ended abnormally: {}", e);
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let cancelled = self.state.get() == CrawlState::Running;
        if cancelled {
            let discarded = ctx.frontier.len();
            ctx.frontier.close();
            tracing::info!("Crawl cancelled, discarding {} queued URLs", discarded);
        }
        self.state.advance(CrawlState::Done)?;

        Ok(ctx.counters.summarize(seeds.len(), started_at, cancelled))
    }
}

impl RunContext {
    async fn worker(&self, id: usize) {
        loop {
            let entry = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                entry = self.frontier.pop() => entry,
            };

            let Some(entry) = entry else {
                if self.state.advance_from(CrawlState::Running, CrawlState::Draining) {
                    tracing::debug!("Worker {} observed an empty frontier", id);
                }
                break;
            };

            let url = entry.url.clone();
            let outcome = AssertUnwindSafe(self.process(id, entry))
                .catch_unwind()
                .await;
            if let Err(panic) = outcome {
                RunCounters::bump(&self.counters.worker_panics);
                tracing::error!(
                    "Worker {} panicked while processing {}: {}",
                    id,
                    url,
                    panic_message(panic.as_ref())
                );
            }

            self.frontier.task_done();
        }
        tracing::trace!("Worker {} exiting", id);
    }

    /// Fetch, extract, store and enqueue links for one frontier entry
    ///
    /// The normalized URL is only the visited-set key. The page is fetched
    /// and recorded at the URL it was discovered under.
    async fn process(&self, worker: usize, entry: FrontierEntry) {
        let normalized = normalize_url(&entry.url);
        if !self.visited.test_and_mark(&normalized) {
            RunCounters::bump(&self.counters.already_visited);
            tracing::trace!("Skipping already visited {}", normalized);
            return;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => return,
            _ = tokio::time::sleep(self.delay) => {}
        }

        tracing::debug!("Worker {} fetching {}", worker, entry.url);
        let page = tokio::select! {
            _ = self.cancel.cancelled() => return,
            result = self.renderer.render(&entry.url) => result,
        };
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                RunCounters::bump(&self.counters.fetch_failures);
                tracing::warn!("{}", e);
                return;
            }
        };

        let content = extract(&page.html);
        let title = content.title.or(page.title).unwrap_or_default();
        let record = PageRecord::new(title, entry.url.clone(), content.text);

        match self.store.append(record).await {
            Ok(AppendOutcome::Appended) => {
                RunCounters::bump(&self.counters.pages_stored);
                tracing::info!("Stored {}", entry.url);
            }
            Ok(AppendOutcome::Duplicate) => {
                RunCounters::bump(&self.counters.duplicates_skipped);
                tracing::debug!("Content of {} already stored, skipped", entry.url);
            }
            Err(e) => {
                RunCounters::bump(&self.counters.store_failures);
                tracing::warn!("Failed to store {}: {}", entry.url, e);
            }
        }

        // Relative links resolve against the address actually served.
        let base = Url::parse(&page.final_url).or_else(|_| Url::parse(&entry.url));
        let Ok(base) = base else {
            return;
        };

        let mut queued = 0usize;
        for link in extract_internal_links(&page.html, &base, &entry.origin) {
            if !self.visited.contains(&normalize_url(&link)) {
                self.frontier
                    .push(FrontierEntry::new(link, Arc::clone(&entry.origin)));
                queued += 1;
            }
        }
        tracing::debug!("Queued {} links from {}", queued, normalized);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
