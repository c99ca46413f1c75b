use crate::features::FeatureRow;

/// Maximum link text length (exclusive) for pagination to count as essential
pub const ESSENTIAL_PAGINATION_MAX_TEXT: usize = 20;

/// Intermediate label terms for one row
///
/// `simple` and `contextual` are the two final labels. Contextual labelling
/// may only add good links through pagination or view-toggle leniency; it
/// never drops a link that simple labelling accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub valuable_content: bool,
    pub obvious_traps: bool,
    pub essential_pagination: bool,
    pub useful_view_toggle: bool,
}

impl Labels {
    pub fn evaluate(row: &FeatureRow) -> Self {
        Self {
            valuable_content: row.leads_to_content
                || row.is_essential_navigation
                || (row.is_main_explore && !row.has_multiple_filters),

            obvious_traps: row.in_faceted_search
                || row.has_sort_and_filter
                || (row.has_multiple_filters && row.has_sorting)
                || row.potential_issues_count > 2,

            essential_pagination: row.is_main_list_pagination
                && !row.has_multiple_filters
                && row.text_length < ESSENTIAL_PAGINATION_MAX_TEXT,

            useful_view_toggle: row.is_view_toggle
                && row.in_main_content
                && !row.in_faceted_search,
        }
    }

    pub fn simple(&self) -> bool {
        self.valuable_content && !self.obvious_traps
    }

    pub fn contextual(&self) -> bool {
        (self.valuable_content || self.essential_pagination || self.useful_view_toggle)
            && !self.obvious_traps
    }
}
