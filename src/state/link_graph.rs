use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use url::Url;

/// Per-link analyzer output, keyed by analyzer name
///
/// A `None` value records that the analyzer ran and failed for this link.
pub type AnalysisResults = BTreeMap<String, Option<serde_json::Value>>;

/// One anchor element found on a crawled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlinkRecord {
    /// The raw `href` attribute as written in the page
    pub href: String,

    /// `href` resolved against the page's URL
    pub absolute_url: Url,

    /// Visible anchor text, whitespace collapsed
    pub text: String,

    /// True if `absolute_url` has a different host than the source page
    pub is_external: bool,

    #[serde(default)]
    pub analysis: AnalysisResults,
}

impl OutlinkRecord {
    /// Looks up one analyzer's result, treating failures as absent
    pub fn analysis_result(&self, analyzer: &str) -> Option<&serde_json::Value> {
        self.analysis.get(analyzer).and_then(Option::as_ref)
    }
}

/// Map from crawled page URL to the outlinks found on it
///
/// Entries keep insertion order (crawl order) and are never rewritten once
/// added. A page whose crawl failed has no entry at all; a page that was
/// crawled but had no anchors has an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkGraph {
    entries: Vec<(String, Vec<OutlinkRecord>)>,
    index: HashMap<String, usize>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page's outlinks
    ///
    /// Returns false and leaves the graph untouched if the page already has
    /// an entry.
    pub fn insert(&mut self, source_url: impl Into<String>, outlinks: Vec<OutlinkRecord>) -> bool {
        let source_url = source_url.into();
        if self.index.contains_key(&source_url) {
            return false;
        }

        self.index.insert(source_url.clone(), self.entries.len());
        self.entries.push((source_url, outlinks));
        true
    }

    pub fn get(&self, source_url: &str) -> Option<&[OutlinkRecord]> {
        self.index
            .get(source_url)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains(&self, source_url: &str) -> bool {
        self.index.contains_key(source_url)
    }

    /// Iterates pages in crawl order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OutlinkRecord])> {
        self.entries
            .iter()
            .map(|(source, outlinks)| (source.as_str(), outlinks.as_slice()))
    }

    /// Number of pages in the graph
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total outlinks across all pages
    pub fn total_outlinks(&self) -> usize {
        self.entries.iter().map(|(_, outlinks)| outlinks.len()).sum()
    }
}

impl Serialize for LinkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (source, outlinks) in &self.entries {
            map.serialize_entry(source, outlinks)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LinkGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LinkGraphVisitor;

        impl<'de> Visitor<'de> for LinkGraphVisitor {
            type Value = LinkGraph;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from source URL to an array of outlinks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LinkGraph, A::Error> {
                let mut graph = LinkGraph::new();
                while let Some((source, outlinks)) =
                    access.next_entry::<String, Vec<OutlinkRecord>>()?
                {
                    if !graph.insert(source.clone(), outlinks) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate source URL '{}'",
                            source
                        )));
                    }
                }
                Ok(graph)
            }
        }

        deserializer.deserialize_map(LinkGraphVisitor)
    }
}
