use url::Url;

/// Normalizes a URL for visited-set comparison
///
/// Normalization is shallow: the only rewrite is removing
/// trailing slashes from the path component, so `https://example.com/docs/`
/// and `https://example.com/docs` compare equal. The host keeps its case,
/// query strings and fragments are kept, and dot segments are not resolved.
///
/// Input that does not parse as an absolute URL is returned unchanged; this
/// function never fails.
///
/// # Examples
///
/// ```
/// use sitegrab::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page/"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/a/?q=1"), "https://example.com/a?q=1");
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    if Url::parse(url_str).is_err() {
        return url_str.to_string();
    }

    // Query and fragment are left untouched
    let suffix_at = url_str.find(&['?', '#'][..]).unwrap_or(url_str.len());
    let (head, suffix) = url_str.split_at(suffix_at);

    let path_at = path_start(head);
    let (prefix, path) = head.split_at(path_at);

    format!("{}{}{}", prefix, path.trim_end_matches('/'), suffix)
}

/// Byte offset where the path begins in a URL with query and fragment removed
fn path_start(head: &str) -> usize {
    match head.find("://") {
        Some(i) => {
            let authority = i + 3;
            head[authority..]
                .find('/')
                .map(|j| authority + j)
                .unwrap_or(head.len())
        }
        None => head.find(':').map(|i| i + 1).unwrap_or(0),
    }
}
