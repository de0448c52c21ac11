use url::Url;

/// Extracts the hostname from a URL
///
/// The port is not part of the hostname. The host is returned as the URL
/// parser produced it; no further case folding is applied.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitegrab::url::extract_host;
///
/// let url = Url::parse("https://example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
}

/// Returns the `scheme://host[:port]` site key of a URL
pub fn site_key(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        (None, _) => format!("{}://", url.scheme()),
    }
}

/// Returns the file stem of the store that holds pages for `page_url`
///
/// The stem is the hostname. An unparseable URL maps to `invalid_url` and a
/// URL without a host maps to `default`.
pub fn store_stem(page_url: &str) -> String {
    match Url::parse(page_url) {
        Ok(url) => extract_host(&url)
            .map(|host| sanitize_stem(&host))
            .unwrap_or_else(|| "default".to_string()),
        Err(e) => {
            tracing::debug!("Cannot derive store name from {}: {}", page_url, e);
            "invalid_url".to_string()
        }
    }
}

/// Keeps a hostname safe to use as a file name
fn sanitize_stem(host: &str) -> String {
    host.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}
