//! State tracking for crawl runs
//!
//! `CrawlState` is the run-level state machine; `StateCell` publishes it to
//! observers through a `watch` channel and rejects illegal transitions.

mod crawl_state;

pub use crawl_state::CrawlState;

use crate::SiteGrabError;
use tokio::sync::watch;

/// Shared, observable holder of a run's `CrawlState`
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<CrawlState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CrawlState::Idle);
        Self { tx }
    }

    /// Current state
    pub fn get(&self) -> CrawlState {
        *self.tx.borrow()
    }

    /// Returns a receiver that observes every transition
    pub fn subscribe(&self) -> watch::Receiver<CrawlState> {
        self.tx.subscribe()
    }

    /// Moves to `next`, failing if the transition is not allowed
    pub fn advance(&self, next: CrawlState) -> Result<(), SiteGrabError> {
        let mut result = Ok(());
        self.tx.send_if_modified(|current| {
            if current.can_transition_to(next) {
                tracing::debug!("Crawl state {} -> {}", current, next);
                *current = next;
                true
            } else {
                result = Err(SiteGrabError::InvalidTransition {
                    from: *current,
                    to: next,
                });
                false
            }
        });
        result
    }

    /// Moves from `from` to `to` only if the run is currently in `from`
    ///
    /// Returns true if this call performed the transition.
    pub fn advance_from(&self, from: CrawlState, to: CrawlState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == from && from.can_transition_to(to) {
                tracing::debug!("Crawl state {} -> {}", current, to);
                *current = to;
                true
            } else {
                false
            }
        })
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
