//! Frontier queue shared by the crawl workers
//!
//! Multiple producers, multiple consumers. The frontier also counts entries
//! that have been popped but not yet finished, so that an empty queue only
//! ends the run once no worker can still push new links.

use crate::url::CrawlOrigin;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// A URL waiting to be visited, with the origin it was discovered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub origin: Arc<CrawlOrigin>,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, origin: Arc<CrawlOrigin>) -> Self {
        Self {
            url: url.into(),
            origin,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<FrontierEntry>,
    in_flight: usize,
    closed: bool,
}

/// Work queue of a crawl run
///
/// Every successful `pop` must be matched by one `task_done` once the popped
/// entry has been fully processed and its links pushed.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues an entry and wakes parked workers
    ///
    /// Pushing into a closed frontier is a no-op.
    pub fn push(&self, entry: FrontierEntry) {
        {
            let mut inner = self.lock();
            if inner.closed {
                return;
            }
            tracing::trace!("Frontier push {}", entry.url);
            inner.queue.push_back(entry);
        }
        self.notify.notify_waiters();
    }

    /// Takes the next entry, parking while the queue is empty but work is
    /// still in flight
    ///
    /// Returns `None` once the queue is empty with nothing in flight, or the
    /// frontier has been closed.
    pub async fn pop(&self) -> Option<FrontierEntry> {
        loop {
            // Registered before checking so a notify between the check and
            // the await is not missed.
            let notified = self.notify.notified();
            {
                let mut inner = self.lock();
                if inner.closed {
                    return None;
                }
                if let Some(entry) = inner.queue.pop_front() {
                    inner.in_flight += 1;
                    tracing::trace!("Frontier pop {} ({} in flight)", entry.url, inner.in_flight);
                    return Some(entry);
                }
                if inner.in_flight == 0 {
                    inner.closed = true;
                    drop(inner);
                    self.notify.notify_waiters();
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Marks one popped entry as finished
    pub fn task_done(&self) {
        {
            let mut inner = self.lock();
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Stops the frontier; pending entries are discarded and parked workers wake
    pub fn close(&self) {
        {
            let mut inner = self.lock();
            inner.closed = true;
            inner.queue.clear();
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of popped entries not yet marked done
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}
