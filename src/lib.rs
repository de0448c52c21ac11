//! Sitegrab: a polite same-origin web crawler
//!
//! This crate crawls one or more seed sites by following internal hyperlinks,
//! extracts readable text and titles from every page it reaches, and appends
//! the results to a per-site JSON store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitegrab operations
#[derive(Debug, Error)]
pub enum SiteGrabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Failed to read seed list {path}: {message}")]
    SeedList { path: String, message: String },

    #[error("No seed URLs were supplied")]
    NoSeeds,

    #[error("Invalid seed URL '{url}': {message}")]
    InvalidSeed { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Why a single page could not be fetched or rendered
#[derive(Debug, Error)]
pub enum FetchErrorKind {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("render timed out")]
    RenderTimeout,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("not an HTML document (content-type {0})")]
    ContentMismatch(String),

    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),
}

/// A failed fetch of one URL. The scheduler skips the URL and keeps crawling.
#[derive(Debug, Error)]
#[error("Fetch failed for {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Result type alias for Sitegrab operations
pub type Result<T> = std::result::Result<T, SiteGrabError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlHandle, Scheduler};
pub use output::CrawlSummary;
pub use state::CrawlState;
pub use storage::{JsonPageStore, PageRecord, PageStore, StoreError, StoreResult};
pub use url::normalize_url;
