//! Label comparison report

use crate::features::FeatureRow;

/// Summary of how simple and contextual labelling compare on a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelReport {
    pub total_links: usize,
    pub simple_good: usize,
    pub contextual_good: usize,

    pub pagination_links: usize,
    pub main_list_pagination: usize,
    pub nested_pagination: usize,

    pub show_param_links: usize,
    pub view_toggles: usize,

    /// Rows labelled good only by contextual labelling
    pub contextual_only: Vec<FeatureRow>,

    /// Rows labelled good only by simple labelling (always empty)
    pub simple_only: Vec<FeatureRow>,
}

impl LabelReport {
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let count = |f: fn(&FeatureRow) -> bool| rows.iter().filter(|r| f(r)).count();

        Self {
            total_links: rows.len(),
            simple_good: count(|r| r.label_simple),
            contextual_good: count(|r| r.label_contextual),
            pagination_links: count(|r| r.has_pagination),
            main_list_pagination: count(|r| r.is_main_list_pagination),
            nested_pagination: count(|r| r.is_nested_pagination),
            show_param_links: count(|r| r.has_show_param),
            view_toggles: count(|r| r.is_view_toggle),
            contextual_only: rows
                .iter()
                .filter(|r| r.label_contextual && !r.label_simple)
                .cloned()
                .collect(),
            simple_only: rows
                .iter()
                .filter(|r| r.label_simple && !r.label_contextual)
                .cloned()
                .collect(),
        }
    }

    /// Extra good links contributed by contextual labelling
    pub fn difference(&self) -> i64 {
        self.contextual_good as i64 - self.simple_good as i64
    }
}

/// Prints the report to stdout
pub fn print_label_report(report: &LabelReport) {
    println!("=== Feature Table ===\n");
    println!("Total links: {}", report.total_links);
    println!();

    println!("Simple vs Contextual Labeling:");
    println!("  Simple 'good' links: {}", report.simple_good);
    println!("  Contextual 'good' links: {}", report.contextual_good);
    println!("  Difference: {}", report.difference());
    println!();

    println!("Pagination Analysis:");
    println!("  Total pagination links: {}", report.pagination_links);
    println!("  Main list pagination: {}", report.main_list_pagination);
    println!("  Nested pagination: {}", report.nested_pagination);
    println!();

    println!("Show Parameter Analysis:");
    println!("  Links with show params: {}", report.show_param_links);
    println!("  View toggles: {}", report.view_toggles);
    println!();

    println!(
        "Contextual good / simple bad ({}):",
        report.contextual_only.len()
    );
    for row in &report.contextual_only {
        println!("  {}", row.url);
        println!(
            "    text: '{}', main list pagination: {}, view toggle: {}, faceted: {}",
            row.link_text, row.is_main_list_pagination, row.is_view_toggle, row.in_faceted_search
        );
    }
    println!();

    println!("Simple good / contextual bad ({}):", report.simple_only.len());
    for row in &report.simple_only {
        println!(
            "  {} (text: '{}', issues: {})",
            row.url, row.link_text, row.potential_issues_count
        );
    }
}
