use url::Url;

/// Keys beginning with this prefix are treated as filter parameters
/// (`f1`, `fCollection`, ...), alongside the literal key `filter`.
pub const FILTER_PREFIX: char = 'f';

/// Returns true if a query key names a filter parameter
pub fn is_filter_key(key: &str) -> bool {
    key == "filter" || key.starts_with(FILTER_PREFIX)
}

/// Query parameters of a URL, in first-appearance order
///
/// Repeated keys collect all of their values. Parameters whose value is
/// blank (`?page=` or a bare `?page`) are dropped entirely, so they never
/// count as present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Parses the query component of a URL
    pub fn from_url(url: &Url) -> Self {
        let mut params: Vec<(String, Vec<String>)> = Vec::new();

        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }

            match params.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value.into_owned()),
                None => params.push((key.into_owned(), vec![value.into_owned()])),
            }
        }

        Self { params }
    }

    /// Returns true if the key is present with at least one non-blank value
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All values of a key, in order
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// The first value of a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Keys in first-appearance order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct keys that name filters
    pub fn filter_key_count(&self) -> usize {
        self.keys().filter(|k| is_filter_key(k)).count()
    }

    /// Returns true if any key names a filter
    pub fn has_filter(&self) -> bool {
        self.keys().any(is_filter_key)
    }
}

/// Non-empty path segments of a URL
///
/// `https://host/explore/` and `https://host/explore` both yield
/// `["explore"]`; the root path yields nothing.
pub fn path_segments(url: &Url) -> Vec<String> {
    url.path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
