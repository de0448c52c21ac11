//! Link extraction and same-site filtering
//!
//! Collects `<a href>` targets from a rendered page, resolves them against
//! the page's own URL and keeps those whose hostname equals the crawl
//! origin's hostname.

use crate::url::CrawlOrigin;
use scraper::{Html, Selector};
use url::Url;

/// Returns the internal links of a page in document order
///
/// Relative targets resolve against `page_url`, not the origin. Links that
/// cannot be resolved are skipped. Duplicates are kept; the visited set
/// deduplicates them later.
///
/// # Example
///
/// ```
/// use sitegrab::crawler::extract_internal_links;
/// use sitegrab::url::CrawlOrigin;
/// use url::Url;
///
/// let origin = CrawlOrigin::from_seed("https://example.test/").unwrap();
/// let page = Url::parse("https://example.test/docs/").unwrap();
/// let html = r#"<a href="intro">Intro</a><a href="https://other.test/">Other</a>"#;
///
/// let links = extract_internal_links(html, &page, &origin);
/// assert_eq!(links, vec!["https://example.test/docs/intro".to_string()]);
/// ```
pub fn extract_internal_links(html: &str, page_url: &Url, origin: &CrawlOrigin) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_link(href, page_url) else {
            continue;
        };
        if origin.classify(&resolved).should_follow() {
            links.push(resolved.to_string());
        } else {
            tracing::trace!("Ignoring external link {}", resolved);
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: targets
/// - targets that do not resolve against the page URL
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match page_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Skipping malformed link '{}' on {}: {}", href, page_url, e);
            None
        }
    }
}
