//! Crawler coordinator - entry point for submitting crawls
//!
//! The coordinator owns the long-lived collaborators (renderer and page
//! store) and starts one independent run per submitted batch of seeds. Each
//! submission returns a `CrawlHandle` through which the caller observes the
//! run's state, cancels it, or awaits its summary.

use crate::config::Config;
use crate::crawler::fetcher::{build_renderer, PageRenderer};
use crate::crawler::scheduler::Scheduler;
use crate::output::CrawlSummary;
use crate::state::CrawlState;
use crate::storage::{JsonPageStore, PageStore};
use crate::url::CrawlOrigin;
use crate::SiteGrabError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn PageStore>,
}

impl Coordinator {
    /// Creates a coordinator with the renderer and JSON store the config selects
    ///
    /// # Errors
    ///
    /// Returns an error if the configured renderer cannot be built.
    pub fn new(config: Config) -> Result<Self, SiteGrabError> {
        let renderer = build_renderer(&config)?;
        let store: Arc<dyn PageStore> = if config.output.dedupe_content {
            Arc::new(JsonPageStore::with_dedupe(&config.output.store_dir))
        } else {
            Arc::new(JsonPageStore::new(&config.output.store_dir))
        };
        Ok(Self::with_components(config, renderer, store))
    }

    /// Creates a coordinator over caller-supplied collaborators
    pub fn with_components(
        config: Config,
        renderer: Arc<dyn PageRenderer>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            renderer,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The store every run of this coordinator writes to
    pub fn store(&self) -> Arc<dyn PageStore> {
        Arc::clone(&self.store)
    }

    /// Starts a crawl of `seeds` and returns immediately
    ///
    /// The seeds of one submission share a visited set; every submission
    /// gets a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `SiteGrabError::NoSeeds` or `SiteGrabError::InvalidSeed`
    /// without starting anything.
    pub fn submit(&self, seeds: Vec<String>) -> Result<CrawlHandle, SiteGrabError> {
        if seeds.is_empty() {
            return Err(SiteGrabError::NoSeeds);
        }
        for seed in &seeds {
            CrawlOrigin::from_seed(seed)?;
        }

        let scheduler = Scheduler::new(
            self.config.crawler.clone(),
            Arc::clone(&self.renderer),
            Arc::clone(&self.store),
        );
        let state = scheduler.subscribe();
        let cancel = CancellationToken::new();

        tracing::info!(
            "Crawl started: {} seed(s), {} worker(s)",
            seeds.len(),
            self.config.crawler.worker_count
        );

        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = scheduler.run(&seeds, token).await;
            match &result {
                Ok(summary) => tracing::info!(
                    "Crawl completed: {} pages stored, {} fetch failures{}",
                    summary.pages_stored,
                    summary.fetch_failures,
                    if summary.cancelled { " (cancelled)" } else { "" }
                ),
                Err(e) => tracing::error!("Crawl failed: {}", e),
            }
            result
        });

        Ok(CrawlHandle {
            state,
            cancel,
            task,
        })
    }

    /// Submits `seeds` and waits for the run to finish
    pub async fn crawl(&self, seeds: Vec<String>) -> Result<CrawlSummary, SiteGrabError> {
        self.submit(seeds)?.wait().await
    }
}

/// Handle to a running crawl
#[derive(Debug)]
pub struct CrawlHandle {
    state: watch::Receiver<CrawlState>,
    cancel: CancellationToken,
    task: JoinHandle<Result<CrawlSummary, SiteGrabError>>,
}

impl CrawlHandle {
    /// Current state of the run
    pub fn state(&self) -> CrawlState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition
    pub fn state_receiver(&self) -> watch::Receiver<CrawlState> {
        self.state.clone()
    }

    /// Stops the run; it goes straight to `Done` without draining the frontier
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once the run's task has finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the run to reach `Done` and returns its summary
    pub async fn wait(self) -> Result<CrawlSummary, SiteGrabError> {
        self.task.await?
    }
}
