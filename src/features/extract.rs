use crate::analysis::ARCHIVE_ANALYZER_NAME;
use crate::features::labels::Labels;
use crate::state::OutlinkRecord;
use crate::url::{path_segments, QueryParams};
use serde::{Deserialize, Serialize};

/// Path segment that marks a main list view
pub const LIST_VIEW_MARKER: &str = "explore";

/// `show` values that switch between entity listings
pub const VIEW_TOGGLE_VALUES: [&str; 3] = ["Collections", "Organizations", "Sites"];

/// `show` values that expand a listing into a detailed view
pub const DETAILED_VIEW_VALUES: [&str; 2] = ["full_details", "expanded"];

pub const NAVIGATION_WORDS: [&str; 4] = ["next", "previous", "page", "more"];
pub const ACTION_WORDS: [&str; 4] = ["view", "show", "display", "browse"];

/// Link texts that always count as essential navigation
pub const ESSENTIAL_NAVIGATION_TEXT: [&str; 4] = ["home", "explore", "browse", "search"];

pub const NAVIGATION_TAGS: [&str; 2] = ["nav", "header"];
pub const MAIN_CONTENT_TAGS: [&str; 2] = ["main", "content"];

const ORGANIZATIONS_SEGMENT: &str = "organizations";
const COLLECTIONS_SEGMENT: &str = "collections";

/// One row of the feature table
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub url: String,
    pub link_text: String,
    pub is_external: bool,

    pub has_pagination: bool,
    pub is_main_list_pagination: bool,
    pub is_nested_pagination: bool,

    pub has_show_param: bool,
    pub show_param_value: String,
    pub is_view_toggle: bool,
    pub is_detailed_view: bool,

    pub path_depth: usize,
    pub path_segments: String,
    pub is_organization_detail: bool,
    pub is_collection_detail: bool,
    pub is_main_explore: bool,

    pub num_query_params: usize,
    pub has_multiple_filters: bool,
    pub has_sort_and_filter: bool,

    pub position_on_page: String,
    pub in_navigation: bool,
    pub in_main_content: bool,

    pub text_length: usize,
    pub is_navigation_text: bool,
    pub is_action_text: bool,

    pub in_faceted_search: bool,
    pub has_sorting: bool,
    pub has_filtering: bool,
    pub potential_issues_count: usize,

    pub leads_to_content: bool,
    pub is_essential_navigation: bool,

    pub source_page: String,
    pub label_simple: bool,
    pub label_contextual: bool,
}

impl FeatureRow {
    /// Derives every feature of an outlink found on `source_page`, then
    /// labels it
    pub fn from_outlink(source_page: &str, outlink: &OutlinkRecord) -> Self {
        let url = &outlink.absolute_url;
        let params = QueryParams::from_url(url);
        let segments = path_segments(url);
        let path_depth = segments.len();
        let has_segment = |name: &str| segments.iter().any(|s| s == name);

        let has_pagination = params.contains("page");
        let show_param_value = params.first("show").unwrap_or("").to_string();
        let has_sorting = params.contains("sort");
        let filter_keys = params.filter_key_count();
        let has_filtering = filter_keys > 0;

        let parents = parent_tags(outlink);
        let in_navigation = parents.iter().any(|tag| NAVIGATION_TAGS.contains(tag));
        let in_main_content = parents.iter().any(|tag| MAIN_CONTENT_TAGS.contains(tag));

        let text = outlink.text.as_str();
        let lower_text = text.to_lowercase();

        let archive = outlink.analysis_result(ARCHIVE_ANALYZER_NAME);
        let in_faceted_search = archive
            .and_then(|a| a.get("in_faceted_search_ui"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let potential_issues_count = archive
            .and_then(|a| a.get("potential_issues"))
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len);

        let leads_to_content = (has_segment(ORGANIZATIONS_SEGMENT)
            || has_segment(COLLECTIONS_SEGMENT))
            && path_depth >= 2;

        let mut row = Self {
            url: url.to_string(),
            link_text: text.to_string(),
            is_external: outlink.is_external,

            has_pagination,
            is_main_list_pagination: has_pagination
                && path_depth <= 2
                && has_segment(LIST_VIEW_MARKER),
            is_nested_pagination: has_pagination && path_depth > 2,

            has_show_param: params.contains("show"),
            is_view_toggle: VIEW_TOGGLE_VALUES.contains(&show_param_value.as_str()),
            is_detailed_view: DETAILED_VIEW_VALUES.contains(&show_param_value.as_str()),
            show_param_value,

            path_depth,
            path_segments: segments.join("/"),
            is_organization_detail: has_segment(ORGANIZATIONS_SEGMENT) && path_depth >= 2,
            is_collection_detail: has_segment(COLLECTIONS_SEGMENT) && path_depth >= 2,
            is_main_explore: url.path().trim_matches('/') == LIST_VIEW_MARKER,

            num_query_params: params.len(),
            has_multiple_filters: filter_keys > 1,
            has_sort_and_filter: has_sorting && has_filtering,

            position_on_page: outlink
                .analysis_result("link_position")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            in_navigation,
            in_main_content,

            text_length: text.chars().count(),
            is_navigation_text: NAVIGATION_WORDS.iter().any(|w| lower_text.contains(w)),
            is_action_text: ACTION_WORDS.iter().any(|w| lower_text.contains(w)),

            in_faceted_search,
            has_sorting,
            has_filtering,
            potential_issues_count,

            leads_to_content,
            is_essential_navigation: ESSENTIAL_NAVIGATION_TEXT.contains(&lower_text.as_str())
                || in_navigation,

            source_page: source_page.to_string(),
            label_simple: false,
            label_contextual: false,
        };

        let labels = Labels::evaluate(&row);
        row.label_simple = labels.simple();
        row.label_contextual = labels.contextual();
        row
    }
}

fn parent_tags(outlink: &OutlinkRecord) -> Vec<&str> {
    outlink
        .analysis_result("parent_elements")
        .and_then(|v| v.as_array())
        .map(|tags| tags.iter().filter_map(|t| t.as_str()).collect())
        .unwrap_or_default()
}
