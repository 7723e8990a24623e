//! Link extraction from fetched HTML
//!
//! Only `<a href>` anchors are followed. Links are resolved against the page
//! URL, kept when they stay on the crawl's target host over http(s), and
//! normalized so they can be compared with the visited set.

use crate::url::{normalize_url, TargetHost};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts the same-host links of a page
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `current_url` - The URL the page was fetched from, used to resolve relative links
/// * `target` - The host the crawl is confined to
///
/// # Returns
///
/// The deduplicated, normalized links. Nothing is returned when `current_url`
/// cannot be parsed.
///
/// # Example
///
/// ```
/// use attuario::crawler::extract_links;
/// use attuario::url::TargetHost;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let target = TargetHost::from_url(&base).unwrap();
/// let html = r#"<a href="/page#top">Page</a><a href="https://other.org/">Other</a>"#;
/// let links = extract_links(html, "https://example.com/", &target);
/// assert_eq!(links.into_iter().collect::<Vec<_>>(), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, current_url: &str, target: &TargetHost) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    let Ok(base_url) = Url::parse(current_url) else {
        tracing::debug!("Cannot resolve links against {}", current_url);
        return links;
    };
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return links;
    };

    let document = Html::parse_document(html);
    for element in document.select(&anchor_selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve_link(href, &base_url, target) {
                links.insert(link);
            }
        }
    }

    links
}

/// Resolves an href and keeps it if it is an http(s) link on the target host
fn resolve_link(href: &str, base_url: &Url, target: &TargetHost) -> Option<String> {
    let href = href.trim();

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    if !target.matches(&absolute_url) {
        return None;
    }

    Some(normalize_url(absolute_url.as_str()))
}
