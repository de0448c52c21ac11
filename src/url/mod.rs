//! URL handling module for Sitegrab
//!
//! This module provides URL normalization, host extraction, store naming and
//! the same-site test that decides which discovered links are internal.

mod domain;
mod normalize;

use crate::SiteGrabError;
use url::Url;

// Re-export main functions
pub use domain::{extract_host, site_key, store_stem};
pub use normalize::normalize_url;

/// Whether a resolved link stays on the crawl origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same hostname as the origin, eligible for the frontier
    Internal,
    /// Any other hostname, including subdomains of the origin
    External,
}

impl LinkScope {
    /// Returns true if the link should be followed
    pub fn should_follow(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// The host a traversal is confined to
///
/// Derived from the seed URL of the traversal and fixed for its lifetime.
/// Every seed in a batch has its own origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlOrigin {
    host: String,
    site: String,
}

impl CrawlOrigin {
    /// Builds the origin of a seed URL
    ///
    /// # Errors
    ///
    /// Returns `SiteGrabError::InvalidSeed` if the seed does not parse or has
    /// no host.
    pub fn from_seed(seed: &str) -> Result<Self, SiteGrabError> {
        let url = Url::parse(seed).map_err(|e| SiteGrabError::InvalidSeed {
            url: seed.to_string(),
            message: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SiteGrabError::InvalidSeed {
                url: seed.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host = extract_host(&url).ok_or_else(|| SiteGrabError::InvalidSeed {
            url: seed.to_string(),
            message: "URL has no host".to_string(),
        })?;

        Ok(Self {
            site: site_key(&url),
            host,
        })
    }

    /// The hostname links are compared against
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The `scheme://host[:port]` the seed belongs to
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Classifies a resolved link against this origin
    ///
    /// Hostnames must match exactly; `blog.example.com` is external to an
    /// `example.com` origin.
    pub fn classify(&self, link: &Url) -> LinkScope {
        match link.host_str() {
            Some(host) if host == self.host => LinkScope::Internal,
            _ => LinkScope::External,
        }
    }
}
