//! URL handling module for Site Mapper
//!
//! This module provides href resolution, scope filtering, frontier identity,
//! host-pattern matching for request blocking, and query-parameter parsing.

mod domain;
mod matcher;
mod query;

use crate::config::CrawlerConfig;
use url::Url;

// Re-export main functions
pub use domain::{host_of, is_external};
pub use matcher::matches_host_pattern;
pub use query::{is_filter_key, path_segments, QueryParams, FILTER_PREFIX};

/// Resolves an anchor's raw `href` against the page it was found on
///
/// Standard relative-reference resolution (RFC 3986 / WHATWG URL): fragments,
/// protocol-relative, path-relative and query-only forms all resolve against
/// `base`.
///
/// # Examples
///
/// ```
/// use site_mapper::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://example.org/a/b?x=1").unwrap();
/// assert_eq!(resolve_href(&base, "../c").unwrap().as_str(), "https://example.org/c");
/// assert_eq!(resolve_href(&base, "//other.org/p").unwrap().as_str(), "https://other.org/p");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Result<Url, url::ParseError> {
    base.join(href)
}

/// Decides whether a discovered URL may be enqueued
///
/// Returns true unconditionally when no allowed hosts are configured.
/// Otherwise the URL's host must be an exact member of `allowed_hosts`;
/// subdomains are not implied and must be listed explicitly.
pub fn is_in_scope(url: &Url, config: &CrawlerConfig) -> bool {
    if config.allowed_hosts.is_empty() {
        return true;
    }

    url.host_str()
        .map(|host| config.allowed_hosts.contains(host))
        .unwrap_or(false)
}

/// Returns true if the URL can be navigated to (http or https)
///
/// `mailto:`, `javascript:`, `tel:` and `data:` links are recorded as
/// outlinks but never fetched.
pub fn is_navigable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// The identity of a page in the frontier and visited set
///
/// Fragments never change the fetched document, so `page#a` and `page#b`
/// are the same page.
pub fn frontier_key(url: &Url) -> Url {
    let mut key = url.clone();
    key.set_fragment(None);
    key
}
