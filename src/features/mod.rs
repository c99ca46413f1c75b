//! Feature extraction and link labelling
//!
//! Flattens a finished link graph into one [`FeatureRow`] per outlink and
//! labels each row twice: a simple rule set and a contextual one that is
//! lenient towards main list pagination and view toggles.

mod extract;
mod labels;
mod report;

pub use extract::{
    FeatureRow, ACTION_WORDS, DETAILED_VIEW_VALUES, ESSENTIAL_NAVIGATION_TEXT, LIST_VIEW_MARKER,
    MAIN_CONTENT_TAGS, NAVIGATION_TAGS, NAVIGATION_WORDS, VIEW_TOGGLE_VALUES,
};
pub use labels::{Labels, ESSENTIAL_PAGINATION_MAX_TEXT};
pub use report::{print_label_report, LabelReport};

use crate::output::{write_atomic, OutputError, OutputResult};
use crate::state::LinkGraph;
use crate::SiteMapperError;
use std::fs;
use std::path::Path;

/// Feature table columns, in the order `FeatureRow` serializes them
pub const COLUMNS: [&str; 33] = [
    "url",
    "link_text",
    "is_external",
    "has_pagination",
    "is_main_list_pagination",
    "is_nested_pagination",
    "has_show_param",
    "show_param_value",
    "is_view_toggle",
    "is_detailed_view",
    "path_depth",
    "path_segments",
    "is_organization_detail",
    "is_collection_detail",
    "is_main_explore",
    "num_query_params",
    "has_multiple_filters",
    "has_sort_and_filter",
    "position_on_page",
    "in_navigation",
    "in_main_content",
    "text_length",
    "is_navigation_text",
    "is_action_text",
    "in_faceted_search",
    "has_sorting",
    "has_filtering",
    "potential_issues_count",
    "leads_to_content",
    "is_essential_navigation",
    "source_page",
    "label_simple",
    "label_contextual",
];

/// One row per (source page, outlink), in graph order
pub fn build_feature_table(graph: &LinkGraph) -> Vec<FeatureRow> {
    graph
        .iter()
        .flat_map(|(source, outlinks)| {
            outlinks
                .iter()
                .map(move |outlink| FeatureRow::from_outlink(source, outlink))
        })
        .collect()
}

/// Writes the table as CSV; an empty table still gets its header row
pub fn write_feature_table(path: &Path, rows: &[FeatureRow]) -> OutputResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let contents = writer
        .into_inner()
        .map_err(|e| OutputError::Io(e.into_error()))?;
    write_atomic(path, &contents)?;
    Ok(())
}

/// Loads a link graph previously written by a crawl
pub fn load_link_graph(path: &Path) -> Result<LinkGraph, SiteMapperError> {
    let contents = fs::read_to_string(path)?;
    let graph = serde_json::from_str(&contents).map_err(OutputError::from)?;
    Ok(graph)
}
