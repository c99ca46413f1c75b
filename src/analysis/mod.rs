//! Per-link analysis pipeline
//!
//! Every anchor found on a crawled page is passed through an ordered set of
//! named analyzers. Each analyzer sees the parsed page and the anchor element
//! and returns a JSON value, stored in the outlink's `analysis` map under the
//! analyzer's name.
//!
//! # Failure isolation
//!
//! An analyzer that returns an error or panics records `null` for that link
//! and logs a warning. It never stops the other analyzers or aborts the page.

mod archive;
mod dom;

use crate::state::AnalysisResults;
use crate::url::resolve_href;
use scraper::{ElementRef, Html};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

pub use archive::{
    ArchiveAnalysis, ArchiveLinkAnalyzer, FacetMarkers, ARCHIVE_ANALYZER_NAME, ISSUE_FACETED_SEARCH,
    ISSUE_FILTER_PARAM, ISSUE_PAGE_PARAM, ISSUE_SHOW_PARAM, ISSUE_SORT_PARAM,
};
pub use dom::{css_classes, dom_hierarchy, parent_elements, MAX_PARENT_DEPTH};

/// Errors an analyzer can report for a single link
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Element has no href attribute")]
    MissingHref,

    #[error("Cannot resolve href: {0}")]
    InvalidHref(#[from] url::ParseError),

    #[error("Failed to serialize analysis result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Analyzer panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

/// A parsed page as seen by analyzers
pub struct Document {
    url: Url,
    html: Html,
}

impl Document {
    /// Parses an HTML document fetched from `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    /// The URL the page was requested as, used as the base for `href`s
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("url", &self.url.as_str()).finish()
    }
}

/// A named per-link analysis
///
/// Analyzers must not depend on each other's results. Plain functions and
/// closures with the matching signature implement this trait.
pub trait LinkAnalyzer: Send + Sync {
    fn analyze(
        &self,
        page: &Document,
        element: ElementRef<'_>,
    ) -> Result<serde_json::Value, AnalyzerError>;
}

impl<F> LinkAnalyzer for F
where
    F: Fn(&Document, ElementRef<'_>) -> Result<serde_json::Value, AnalyzerError> + Send + Sync,
{
    fn analyze(
        &self,
        page: &Document,
        element: ElementRef<'_>,
    ) -> Result<serde_json::Value, AnalyzerError> {
        self(page, element)
    }
}

/// Ordered map from analyzer name to implementation
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<(String, Arc<dyn LinkAnalyzer>)>,
}

impl AnalyzerRegistry {
    /// Creates a registry with no analyzers
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard registry: archive structure plus the static DOM
    /// analyzers
    pub fn with_defaults(markers: FacetMarkers) -> Self {
        let mut registry = Self::new();
        registry
            .register(ARCHIVE_ANALYZER_NAME, ArchiveLinkAnalyzer::new(markers))
            .register("dom_hierarchy", dom_hierarchy)
            .register("css_classes", css_classes)
            .register("parent_elements", parent_elements);
        registry
    }

    /// Adds an analyzer at the end of the run order
    ///
    /// Registering a name that already exists replaces that analyzer in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        analyzer: impl LinkAnalyzer + 'static,
    ) -> &mut Self {
        let name = name.into();
        let analyzer: Arc<dyn LinkAnalyzer> = Arc::new(analyzer);

        match self.analyzers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = analyzer,
            None => self.analyzers.push((name, analyzer)),
        }
        self
    }

    /// Analyzer names in run order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.analyzers.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Runs every analyzer against one anchor element
    ///
    /// The result has one key per registered analyzer; failed analyzers map
    /// to `None`.
    pub fn run(&self, page: &Document, element: ElementRef<'_>) -> AnalysisResults {
        let mut results = AnalysisResults::new();

        for (name, analyzer) in &self.analyzers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(page, element)))
                .unwrap_or_else(|payload| Err(AnalyzerError::Panicked(panic_message(&*payload))));

            let value = match outcome {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        link = %link_url(page, element),
                        page = %page.url(),
                        analyzer = %name,
                        error = %e,
                        "Analyzer failed"
                    );
                    None
                }
            };

            results.insert(name.clone(), value);
        }

        results
    }
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The anchor's resolved target for diagnostics, falling back to the raw
/// `href` when it cannot be resolved
fn link_url(page: &Document, element: ElementRef<'_>) -> String {
    match element.value().attr("href") {
        Some(href) => resolve_href(page.url(), href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string()),
        None => String::new(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
