//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page rendering over HTTP with request blocking
//! - Outlink extraction and per-link analysis
//! - Timeout retries with linear backoff
//! - Rate limiting between requests
//! - Overall crawl coordination

mod coordinator;
mod executor;
mod parser;
mod rate_limiter;
mod renderer;

pub use coordinator::{Coordinator, CrawlReport};
pub use executor::{PageCrawlResult, PageCrawler, NAVIGATION_TIMEOUT, RETRY_BACKOFF_STEP};
pub use parser::{extract_outlinks, ExtractionError};
pub use rate_limiter::RateLimiter;
pub use renderer::{
    build_http_client, HttpRenderer, NavigationRequest, PageRenderer, RenderError, RenderedPage,
    RequestBlocker, MAX_REDIRECTS,
};

use crate::analysis::{AnalyzerRegistry, FacetMarkers};
use crate::config::Config;
use crate::output::FileOutputHandler;
use crate::url::is_navigable;
use crate::SiteMapperError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the HTTP session
/// 2. Build the default analyzer set from the `[analysis]` config
/// 3. Crawl breadth-first from `seed` until the frontier or page limit runs out,
///    or `interrupt` is set
/// 4. Write the final artifacts into the configured output directory
///
/// The HTTP session lives exactly as long as this call.
pub async fn crawl(
    config: Config,
    seed: Url,
    interrupt: Arc<AtomicBool>,
) -> Result<CrawlReport, SiteMapperError> {
    if !is_navigable(&seed) {
        return Err(SiteMapperError::InvalidSeed(seed.to_string()));
    }

    let renderer = HttpRenderer::new()?;
    let analyzers = AnalyzerRegistry::with_defaults(FacetMarkers::from_config(&config.analysis));
    let crawler = PageCrawler::new(
        Arc::new(renderer),
        analyzers,
        RequestBlocker::from_config(&config.crawler),
        config.crawler.max_retries,
    );

    let output = FileOutputHandler::new(&config.output.output_dir)?;

    Coordinator::new(config, seed, crawler, Box::new(output))
        .with_interrupt(interrupt)
        .run()
        .await
}
