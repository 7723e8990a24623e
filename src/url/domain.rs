use url::Url;

/// The host (and explicit port) a crawl is confined to
///
/// Two URLs belong to the same crawl when their lowercase host and their port
/// match, the same comparison as the authority's `host[:port]` text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetHost {
    host: String,
    port: Option<u16>,
}

impl TargetHost {
    /// Extracts the target host from a URL
    ///
    /// Returns None if the URL has no host (e.g. `mailto:` or `data:` URLs).
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = extract_domain(url)?;
        Some(Self {
            host,
            port: url.port(),
        })
    }

    /// Returns true if `url` points at this host
    pub fn matches(&self, url: &Url) -> bool {
        extract_domain(url).as_deref() == Some(self.host.as_str()) && url.port() == self.port
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Extracts the lowercase domain/host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use attuario::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
