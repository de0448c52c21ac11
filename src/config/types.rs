use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitegrab
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Seed URLs crawled in addition to any given on the command line
    #[serde(default)]
    pub seeds: Vec<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which page renderer the fetch stage uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP GET, no script execution
    #[default]
    Http,
    /// Headless Chromium (requires the `browser` feature)
    Browser,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent workers draining the frontier
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: u32,

    /// Polite delay inserted before each fetch (milliseconds)
    #[serde(rename = "per-request-delay", default = "default_per_request_delay")]
    pub per_request_delay: u64,

    /// Render deadline for a single page (milliseconds)
    #[serde(rename = "per-page-timeout", default = "default_per_page_timeout")]
    pub per_page_timeout: u64,

    /// Renderer used to load pages
    #[serde(default)]
    pub renderer: RendererKind,

    /// Overall deadline for one crawl run in seconds, 0 disables it
    #[serde(rename = "run-deadline", default)]
    pub run_deadline: u64,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.per_request_delay)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.per_page_timeout)
    }

    /// Returns the run deadline, if one is configured
    pub fn deadline(&self) -> Option<Duration> {
        (self.run_deadline > 0).then(|| Duration::from_secs(self.run_deadline))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            per_request_delay: default_per_request_delay(),
            per_page_timeout: default_per_page_timeout(),
            renderer: RendererKind::default(),
            run_deadline: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one JSON store file per site
    #[serde(rename = "store-dir", default = "default_store_dir")]
    pub store_dir: String,

    /// Skip pages whose content fingerprint is already in the site's store
    #[serde(rename = "dedupe-content", default)]
    pub dedupe_content: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            dedupe_content: false,
        }
    }
}

/// Settings given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub worker_count: Option<u32>,
    pub store_dir: Option<String>,
    pub dedupe_content: bool,
}

impl ConfigOverrides {
    /// Writes the overrides into `config`; unset fields leave it unchanged
    pub fn apply(self, config: &mut Config) {
        if let Some(workers) = self.worker_count {
            config.crawler.worker_count = workers;
        }
        if let Some(dir) = self.store_dir {
            config.output.store_dir = dir;
        }
        if self.dedupe_content {
            config.output.dedupe_content = true;
        }
    }
}

fn default_worker_count() -> u32 {
    5
}

fn default_per_request_delay() -> u64 {
    1000
}

fn default_per_page_timeout() -> u64 {
    60_000
}

fn default_crawler_name() -> String {
    "sitegrab".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_store_dir() -> String {
    "./scraping_folder".to_string()
}
