//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop:
//! - Owning the frontier and visited set
//! - Rate limiting and executing one page at a time
//! - Filtering discovered links by scheme and scope before enqueueing
//! - Growing and persisting the link graph
//! - Stopping on page limit, frontier exhaustion, or interrupt

use crate::config::Config;
use crate::crawler::executor::{PageCrawlResult, PageCrawler};
use crate::crawler::rate_limiter::RateLimiter;
use crate::output::{CrawlStatistics, OutputHandler, StopReason};
use crate::state::{FrontierState, LinkGraph};
use crate::url::{frontier_key, is_in_scope, is_navigable};
use crate::SiteMapperError;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub graph: LinkGraph,
    pub statistics: CrawlStatistics,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    seed: Url,
    crawler: PageCrawler,
    rate_limiter: RateLimiter,
    frontier: FrontierState,
    graph: LinkGraph,
    output: Box<dyn OutputHandler>,
    interrupt: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a coordinator with the seed URL as the only frontier entry
    ///
    /// The seed is never scope-checked.
    pub fn new(
        config: Config,
        seed: Url,
        crawler: PageCrawler,
        output: Box<dyn OutputHandler>,
    ) -> Self {
        let seed = frontier_key(&seed);
        let rate_limiter = RateLimiter::new(config.crawler.delay_duration());

        Self {
            frontier: FrontierState::with_seed(seed.clone()),
            config,
            seed,
            crawler,
            rate_limiter,
            graph: LinkGraph::new(),
            output,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses an externally owned interrupt flag (set by the Ctrl-C handler)
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Handle that stops the crawl before the next page when set
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Runs the crawl loop to completion
    ///
    /// Page failures never end the crawl. The only error returned is a
    /// failure to write the final artifacts.
    pub async fn run(mut self) -> Result<CrawlReport, SiteMapperError> {
        let started_at = Utc::now();
        let page_limit = self.config.crawler.page_limit;

        tracing::info!(
            "Starting crawl at {} (page limit {}, delay {:?})",
            self.seed,
            page_limit,
            self.rate_limiter.delay()
        );

        let mut pages_crawled = 0;
        let mut pages_failed = 0;

        let stop_reason = loop {
            if self.interrupt.load(Ordering::SeqCst) {
                tracing::warn!("Interrupt received, stopping crawl");
                break StopReason::Interrupted;
            }

            if self.frontier.visited_count() >= page_limit {
                tracing::info!("Page limit of {} reached", page_limit);
                break StopReason::PageLimitReached;
            }

            let url = match self.frontier.pop() {
                Some(url) => url,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break StopReason::FrontierExhausted;
                }
            };

            if self.frontier.is_visited(&url) {
                tracing::debug!("Skipping already visited {}", url);
                continue;
            }

            self.frontier.mark_visited(url.clone());
            self.rate_limiter.wait().await;

            tracing::info!(
                url = %url,
                visited = self.frontier.visited_count(),
                pending = self.frontier.pending_count(),
                "Crawling page"
            );

            let outcome = AssertUnwindSafe(self.crawler.crawl_page(&url))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(result)) => {
                    pages_crawled += 1;
                    self.record_page(result);

                    if let Err(e) = self.output.save_intermediate(&self.graph) {
                        tracing::error!("Failed to save intermediate results: {}", e);
                    }
                }
                Ok(Err(e)) => {
                    pages_failed += 1;
                    tracing::warn!(url = %e.url(), "Page crawl failed: {}", e);
                }
                Err(_) => {
                    pages_failed += 1;
                    tracing::error!(url = %url, "Unexpected failure while crawling page");
                }
            }
        };

        let statistics = CrawlStatistics {
            seed_url: self.seed.to_string(),
            started_at,
            finished_at: Utc::now(),
            stop_reason,
            pages_visited: self.frontier.visited_count(),
            pages_crawled,
            pages_failed,
            pages_pending: self.frontier.pending_count(),
            total_outlinks: 0,
            external_outlinks: 0,
        }
        .with_graph_counts(&self.graph);

        self.output.save_final(&self.graph)?;

        tracing::info!(
            "Crawl completed: {} pages visited, {} crawled, {} failed ({})",
            statistics.pages_visited,
            statistics.pages_crawled,
            statistics.pages_failed,
            statistics.stop_reason
        );

        Ok(CrawlReport {
            graph: self.graph,
            statistics,
        })
    }

    /// Enqueues new in-scope links and records the page in the link graph
    fn record_page(&mut self, result: PageCrawlResult) {
        let mut enqueued = 0;

        for outlink in &result.outlinks {
            if !is_navigable(&outlink.absolute_url) {
                continue;
            }

            let candidate = frontier_key(&outlink.absolute_url);
            if self.frontier.is_known(&candidate) {
                continue;
            }

            if !is_in_scope(&candidate, &self.config.crawler) {
                tracing::debug!("Out of scope: {}", candidate);
                continue;
            }

            if self.frontier.push(candidate) {
                enqueued += 1;
            }
        }

        tracing::debug!(
            url = %result.url,
            "{} outlinks, {} newly enqueued",
            result.outlinks_count,
            enqueued
        );

        self.graph.insert(result.url.to_string(), result.outlinks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalyzerRegistry;
    use crate::crawler::renderer::{
        NavigationRequest, PageRenderer, RenderError, RenderedPage, RequestBlocker,
    };
    use crate::output::OutputResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves pages from a fixed site map; unknown paths are 404s
    struct SiteRenderer {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl SiteRenderer {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageRenderer for SiteRenderer {
        async fn render(
            &self,
            request: &NavigationRequest<'_>,
        ) -> Result<RenderedPage, RenderError> {
            let url = request.url.to_string();
            self.requests.lock().unwrap().push(url.clone());

            if url.contains("/panic") {
                panic!("renderer crashed");
            }

            match self.pages.get(&url) {
                Some(html) => Ok(RenderedPage {
                    url: request.url.clone(),
                    final_url: request.url.clone(),
                    status: 200,
                    html: html.clone(),
                }),
                None => Err(RenderError::Http { status: 404 }),
            }
        }
    }

    #[derive(Default)]
    struct Saves {
        intermediate: usize,
        finals: Vec<LinkGraph>,
    }

    /// Records what the coordinator persisted
    #[derive(Clone, Default)]
    struct RecordingOutput(Arc<Mutex<Saves>>);

    impl OutputHandler for RecordingOutput {
        fn save_intermediate(&mut self, _graph: &LinkGraph) -> OutputResult<()> {
            self.0.lock().unwrap().intermediate += 1;
            Ok(())
        }

        fn save_final(&mut self, graph: &LinkGraph) -> OutputResult<()> {
            self.0.lock().unwrap().finals.push(graph.clone());
            Ok(())
        }
    }

    fn config(allowed_hosts: &[&str], page_limit: usize) -> Config {
        let mut config = Config::default();
        config.crawler.allowed_hosts = allowed_hosts.iter().map(|h| h.to_string()).collect();
        config.crawler.page_limit = page_limit;
        config.crawler.delay = 0.0;
        config.crawler.max_retries = 1;
        config
    }

    fn coordinator(
        config: Config,
        seed: &str,
        renderer: Arc<SiteRenderer>,
    ) -> (Coordinator, RecordingOutput) {
        let crawler = PageCrawler::new(
            renderer,
            AnalyzerRegistry::new(),
            RequestBlocker::default(),
            config.crawler.max_retries,
        );
        let output = RecordingOutput::default();
        let coordinator = Coordinator::new(
            config,
            Url::parse(seed).unwrap(),
            crawler,
            Box::new(output.clone()),
        );
        (coordinator, output)
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let renderer = SiteRenderer::new(&[
            ("https://a.org/", r#"<a href="/1">1</a><a href="/2">2</a>"#),
            ("https://a.org/1", r#"<a href="/3">3</a>"#),
            ("https://a.org/2", r#"<a href="/1">1 again</a>"#),
            ("https://a.org/3", ""),
        ]);
        let (coordinator, output) =
            coordinator(config(&[], 100), "https://a.org/", renderer.clone());

        let report = coordinator.run().await.unwrap();

        assert_eq!(
            renderer.requests(),
            vec![
                "https://a.org/",
                "https://a.org/1",
                "https://a.org/2",
                "https://a.org/3"
            ]
        );
        assert_eq!(report.statistics.stop_reason, StopReason::FrontierExhausted);
        assert_eq!(report.graph.len(), 4);
        assert_eq!(report.graph.get("https://a.org/3"), Some(&[][..]));

        let saves = output.0.lock().unwrap();
        assert_eq!(saves.intermediate, 4);
        assert_eq!(saves.finals.len(), 1);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let renderer = SiteRenderer::new(&[(
            "https://a.org/",
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
        )]);
        let (coordinator, _) = coordinator(config(&[], 2), "https://a.org/", renderer.clone());

        let report = coordinator.run().await.unwrap();

        assert_eq!(renderer.requests().len(), 2);
        assert_eq!(report.statistics.pages_visited, 2);
        assert_eq!(report.statistics.stop_reason, StopReason::PageLimitReached);
        assert_eq!(report.statistics.pages_pending, 2);
    }

    #[tokio::test]
    async fn test_zero_page_limit_still_saves() {
        let renderer = SiteRenderer::new(&[]);
        let (coordinator, output) =
            coordinator(config(&[], 0), "https://a.org/", renderer.clone());

        let report = coordinator.run().await.unwrap();

        assert!(renderer.requests().is_empty());
        assert!(report.graph.is_empty());
        assert_eq!(output.0.lock().unwrap().finals.len(), 1);
    }

    #[tokio::test]
    async fn test_scope_and_scheme_filtering() {
        let renderer = SiteRenderer::new(&[
            (
                "https://seed.org/",
                r#"<a href="https://a.org/in">in</a>
                   <a href="https://b.org/out">out</a>
                   <a href="mailto:x@a.org">mail</a>
                   <a href="https://a.org/in#frag">same page</a>"#,
            ),
            ("https://a.org/in", ""),
        ]);
        let (coordinator, _) = coordinator(
            config(&["a.org"], 100),
            "https://seed.org/",
            renderer.clone(),
        );

        let report = coordinator.run().await.unwrap();

        assert_eq!(renderer.requests(), vec!["https://seed.org/", "https://a.org/in"]);
        assert_eq!(report.graph.get("https://seed.org/").unwrap().len(), 4);

        for (source, _) in report.graph.iter().skip(1) {
            let host = Url::parse(source).unwrap().host_str().unwrap().to_string();
            assert_eq!(host, "a.org");
        }
    }

    #[tokio::test]
    async fn test_failed_page_has_no_entry() {
        let renderer = SiteRenderer::new(&[
            (
                "https://a.org/",
                r#"<a href="/missing">gone</a><a href="/panic">boom</a><a href="/ok">ok</a>"#,
            ),
            ("https://a.org/ok", ""),
        ]);
        let (coordinator, _) = coordinator(config(&[], 100), "https://a.org/", renderer.clone());

        let report = coordinator.run().await.unwrap();

        assert_eq!(renderer.requests().len(), 4);
        assert!(!report.graph.contains("https://a.org/missing"));
        assert!(!report.graph.contains("https://a.org/panic"));
        assert!(report.graph.contains("https://a.org/ok"));
        assert_eq!(report.statistics.pages_failed, 2);
        assert_eq!(report.statistics.pages_crawled, 2);
    }

    #[tokio::test]
    async fn test_interrupt_stops_before_next_page() {
        let renderer = SiteRenderer::new(&[("https://a.org/", r#"<a href="/1">1</a>"#)]);
        let (coordinator, output) =
            coordinator(config(&[], 100), "https://a.org/", renderer.clone());

        coordinator.interrupt_handle().store(true, Ordering::SeqCst);
        let report = coordinator.run().await.unwrap();

        assert!(renderer.requests().is_empty());
        assert_eq!(report.statistics.stop_reason, StopReason::Interrupted);
        assert_eq!(output.0.lock().unwrap().finals.len(), 1);
    }
}
