//! Outlink extraction
//!
//! Turns a rendered page into one `OutlinkRecord` per anchor element, in
//! document order, running the analyzer registry on each anchor.
//!
//! **Skipped (logged, not an error):**
//! - `<a>` elements without an `href` attribute
//! - `href`s that cannot be resolved against the page URL
//!
//! Unlike frontier scheduling, extraction keeps every resolvable link,
//! including `mailto:`, `javascript:` and fragment-only ones.

use crate::analysis::{AnalyzerRegistry, Document};
use crate::crawler::renderer::RenderedPage;
use crate::state::OutlinkRecord;
use crate::url::{is_external, resolve_href};
use scraper::{ElementRef, Selector};
use thiserror::Error;
use url::Url;

/// Extraction failures that invalidate the whole page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{url} cannot be used as a base URL")]
    UnusableBase { url: String },

    #[error("Invalid anchor selector: {0}")]
    Selector(String),
}

/// Extracts every anchor of a rendered page
///
/// `source` is the URL the page was requested as; `href`s are resolved
/// against it and `is_external` compares hosts with it.
///
/// # Example
///
/// ```
/// use site_mapper::analysis::AnalyzerRegistry;
/// use site_mapper::crawler::{extract_outlinks, RenderedPage};
/// use url::Url;
///
/// let source = Url::parse("https://example.com/docs/").unwrap();
/// let page = RenderedPage {
///     url: source.clone(),
///     final_url: source.clone(),
///     status: 200,
///     html: r#"<a href="intro">Intro</a><a name="top">no href</a>"#.to_string(),
/// };
///
/// let outlinks = extract_outlinks(&page, &source, &AnalyzerRegistry::new()).unwrap();
/// assert_eq!(outlinks.len(), 1);
/// assert_eq!(outlinks[0].absolute_url.as_str(), "https://example.com/docs/intro");
/// ```
pub fn extract_outlinks(
    page: &RenderedPage,
    source: &Url,
    analyzers: &AnalyzerRegistry,
) -> Result<Vec<OutlinkRecord>, ExtractionError> {
    if source.cannot_be_a_base() {
        return Err(ExtractionError::UnusableBase {
            url: source.to_string(),
        });
    }

    let anchor_selector =
        Selector::parse("a").map_err(|e| ExtractionError::Selector(format!("{:?}", e)))?;

    let document = Document::parse(source.clone(), &page.html);
    let mut outlinks = Vec::new();

    for element in document.html().select(&anchor_selector) {
        if let Some(record) = extract_anchor(&document, element, analyzers) {
            outlinks.push(record);
        }
    }

    Ok(outlinks)
}

fn extract_anchor(
    document: &Document,
    element: ElementRef<'_>,
    analyzers: &AnalyzerRegistry,
) -> Option<OutlinkRecord> {
    let href = element.value().attr("href")?;

    let absolute_url = match resolve_href(document.url(), href) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(
                url = %document.url(),
                href,
                "Skipping anchor with unresolvable href: {}",
                e
            );
            return None;
        }
    };

    Some(OutlinkRecord {
        href: href.to_string(),
        is_external: is_external(document.url(), &absolute_url),
        absolute_url,
        text: anchor_text(element),
        analysis: analyzers.run(document, element),
    })
}

/// Visible text of an anchor with runs of whitespace collapsed
fn anchor_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
