use crate::analysis::{AnalyzerError, Document};
use scraper::ElementRef;
use serde_json::{json, Value};

/// How many ancestors `parent_elements` reports
pub const MAX_PARENT_DEPTH: usize = 5;

/// Selector-like path from the root element down to the anchor
///
/// Each step is the tag name, followed by `#id` if the element has one, or
/// else by its classes joined with `.`. Steps are joined with ` > `.
pub fn dom_hierarchy(_page: &Document, element: ElementRef<'_>) -> Result<Value, AnalyzerError> {
    let mut path: Vec<String> = std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .map(step_selector)
        .collect();
    path.reverse();

    Ok(json!(path.join(" > ")))
}

fn step_selector(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut selector = value.name().to_string();

    match value.id().filter(|id| !id.is_empty()) {
        Some(id) => {
            selector.push('#');
            selector.push_str(id);
        }
        None => {
            for class in value.attr("class").unwrap_or("").split_whitespace() {
                selector.push('.');
                selector.push_str(class);
            }
        }
    }

    selector
}

/// The anchor's classes in attribute order
pub fn css_classes(_page: &Document, element: ElementRef<'_>) -> Result<Value, AnalyzerError> {
    let classes: Vec<&str> = element
        .value()
        .attr("class")
        .unwrap_or("")
        .split_whitespace()
        .collect();

    Ok(json!(classes))
}

/// Tag names of the nearest ancestors, innermost first
pub fn parent_elements(_page: &Document, element: ElementRef<'_>) -> Result<Value, AnalyzerError> {
    let parents: Vec<&str> = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_PARENT_DEPTH)
        .map(|el| el.value().name())
        .collect();

    Ok(json!(parents))
}
