/// Checks if a host matches a blocklist pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: "wayback.archive-it.org" matches only that host
/// 2. Wildcard: "*.archive-it.org" matches the bare host and every
///    subdomain of it, at any depth
///
/// Hosts are expected in the lowercase form produced by URL parsing.
///
/// # Examples
///
/// ```
/// use site_mapper::url::matches_host_pattern;
///
/// assert!(matches_host_pattern("wayback.archive-it.org", "wayback.archive-it.org"));
/// assert!(!matches_host_pattern("wayback.archive-it.org", "archive-it.org"));
///
/// assert!(matches_host_pattern("*.archive-it.org", "archive-it.org"));
/// assert!(matches_host_pattern("*.archive-it.org", "wayback.archive-it.org"));
/// assert!(!matches_host_pattern("*.archive-it.org", "notarchive-it.org"));
/// ```
pub fn matches_host_pattern(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}
