use url::Url;

/// Returns the host of a URL
///
/// Hosts of parsed URLs are already lowercase, so the result can be compared
/// directly against configured host lists.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mapper::url::host_of;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(host_of(&url), Some("example.com"));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(host_of(&url), None);
/// ```
pub fn host_of(url: &Url) -> Option<&str> {
    url.host_str()
}

/// Returns true if `target` lives on a different host than `source`
///
/// A link without a host (`mailto:`, `javascript:`) counts as external.
pub fn is_external(source: &Url, target: &Url) -> bool {
    host_of(source) != host_of(target)
}
