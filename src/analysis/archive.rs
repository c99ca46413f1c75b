use crate::analysis::{AnalyzerError, Document, LinkAnalyzer};
use crate::config::AnalysisConfig;
use crate::url::{path_segments, resolve_href, QueryParams};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use url::Url;

/// Registry key of the archive-structure analyzer
pub const ARCHIVE_ANALYZER_NAME: &str = "analyze_archive_it_link";

pub const ISSUE_FACETED_SEARCH: &str = "Link is inside a faceted search interface";
pub const ISSUE_SORT_PARAM: &str = "URL contains sorting parameter";
pub const ISSUE_FILTER_PARAM: &str = "URL contains filter parameter";
pub const ISSUE_PAGE_PARAM: &str = "URL contains pagination parameter";
pub const ISSUE_SHOW_PARAM: &str = "URL contains show parameter";

/// Structural markers identifying a faceted-search container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetMarkers {
    classes: Vec<String>,
    test_id_attribute: String,
    test_id_substring: String,
}

impl FacetMarkers {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            classes: config.facet_classes.clone(),
            test_id_attribute: config.facet_test_id_attribute.to_ascii_lowercase(),
            test_id_substring: config.facet_test_id_substring.clone(),
        }
    }

    /// Returns true if this element itself carries a marker
    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();

        let has_marker_class = value
            .attr("class")
            .map(|classes| {
                classes
                    .split_whitespace()
                    .any(|class| self.classes.iter().any(|marker| marker == class))
            })
            .unwrap_or(false);

        has_marker_class
            || value
                .attr(&self.test_id_attribute)
                .is_some_and(|test_id| test_id.contains(&self.test_id_substring))
    }

    /// Returns true if the element or any ancestor up to the root carries a
    /// marker
    pub fn encloses(&self, element: ElementRef<'_>) -> bool {
        std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|el| self.matches(el))
    }
}

impl Default for FacetMarkers {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Archive-structure classification of a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveAnalysis {
    pub in_faceted_search_ui: bool,
    pub has_query_params: bool,
    pub has_sort_param: bool,
    pub has_filter_param: bool,
    pub has_page_param: bool,
    pub has_show_param: bool,
    pub path: String,
    pub path_segments: Vec<String>,
    /// Human-readable trap indicators, always in detection order:
    /// faceted search, sort, filter, pagination, show
    pub potential_issues: Vec<String>,
}

impl ArchiveAnalysis {
    /// Classifies a resolved link URL
    pub fn classify(url: &Url, in_faceted_search_ui: bool) -> Self {
        let params = QueryParams::from_url(url);

        let has_sort_param = params.contains("sort");
        let has_filter_param = params.has_filter();
        let has_page_param = params.contains("page");
        let has_show_param = params.contains("show");

        let potential_issues = [
            (in_faceted_search_ui, ISSUE_FACETED_SEARCH),
            (has_sort_param, ISSUE_SORT_PARAM),
            (has_filter_param, ISSUE_FILTER_PARAM),
            (has_page_param, ISSUE_PAGE_PARAM),
            (has_show_param, ISSUE_SHOW_PARAM),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, issue)| issue.to_string())
        .collect();

        Self {
            in_faceted_search_ui,
            has_query_params: url.query().is_some_and(|q| !q.is_empty()),
            has_sort_param,
            has_filter_param,
            has_page_param,
            has_show_param,
            path: url.path().to_string(),
            path_segments: path_segments(url),
            potential_issues,
        }
    }
}

/// Analyzer producing an `ArchiveAnalysis` for each anchor
#[derive(Debug, Clone, Default)]
pub struct ArchiveLinkAnalyzer {
    markers: FacetMarkers,
}

impl ArchiveLinkAnalyzer {
    pub fn new(markers: FacetMarkers) -> Self {
        Self { markers }
    }
}

impl LinkAnalyzer for ArchiveLinkAnalyzer {
    fn analyze(
        &self,
        page: &Document,
        element: ElementRef<'_>,
    ) -> Result<serde_json::Value, AnalyzerError> {
        let href = element
            .value()
            .attr("href")
            .ok_or(AnalyzerError::MissingHref)?;
        let url = resolve_href(page.url(), href)?;

        let analysis = ArchiveAnalysis::classify(&url, self.markers.encloses(element));
        Ok(serde_json::to_value(analysis)?)
    }
}
