use url::{Position, Url};

/// Normalizes a URL into the canonical key used for deduplication
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything after `#`)
/// 2. Remove trailing slashes, unless the result is exactly `scheme://host/`
///
/// Nothing else is rewritten: scheme, host case as parsed, path and query are kept,
/// so two URLs that differ only in query order stay distinct.
///
/// The function is idempotent, and input the `url` crate cannot parse is
/// handled at the string level with the same two rules.
///
/// # Examples
///
/// ```
/// use attuario::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page/#top"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let Ok(mut url) = Url::parse(url_str) else {
        return normalize_unparsed(url_str);
    };

    url.set_fragment(None);

    // Only hierarchical URLs have a scheme://host/ root to protect
    let root = if url.cannot_be_a_base() {
        String::new()
    } else {
        format!("{}/", &url[..Position::BeforePath])
    };

    let mut normalized = url.to_string();
    while normalized.ends_with('/') && normalized.len() > root.len() {
        normalized.pop();
    }
    normalized
}

/// String-level fallback for URLs that fail to parse
fn normalize_unparsed(url_str: &str) -> String {
    let without_fragment = match url_str.split_once('#') {
        Some((before, _)) => before,
        None => url_str,
    };
    without_fragment.trim_end_matches('/').to_string()
}
