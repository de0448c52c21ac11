/// Crawl run state definitions
///
/// A run moves through `Idle → Running → Draining → Done`. Cancellation jumps
/// straight from `Running` to `Done`.
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlState {
    /// No seeds submitted yet
    #[default]
    Idle,

    /// Frontier non-empty and/or workers hold in-flight URLs
    Running,

    /// Frontier empty and nothing in flight; workers are exiting
    Draining,

    /// All workers have exited
    Done,
}

impl CrawlState {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Done)
                | (Self::Draining, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
