//! Page crawl executor
//!
//! Fetches a single page with timeout retries, then extracts and analyzes
//! its outlinks.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Navigation timeout | Retry until `max_retries` attempts, sleeping `attempt * 2`s |
//! | Any other render error | Fail immediately |
//! | Extraction failure | Fail immediately |

use crate::analysis::AnalyzerRegistry;
use crate::crawler::parser::extract_outlinks;
use crate::crawler::renderer::{
    NavigationRequest, PageRenderer, RenderError, RenderedPage, RequestBlocker,
};
use crate::state::OutlinkRecord;
use crate::NetworkError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Fixed per-attempt navigation timeout
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Linear backoff step between timed-out attempts
pub const RETRY_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Outcome of a successfully crawled page
#[derive(Debug, Clone, PartialEq)]
pub struct PageCrawlResult {
    pub url: Url,
    pub outlinks: Vec<OutlinkRecord>,
    pub outlinks_count: usize,
}

/// Crawls one page at a time through a `PageRenderer`
#[derive(Clone)]
pub struct PageCrawler {
    renderer: Arc<dyn PageRenderer>,
    analyzers: AnalyzerRegistry,
    blocker: RequestBlocker,
    max_retries: u32,
    navigation_timeout: Duration,
}

impl PageCrawler {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        analyzers: AnalyzerRegistry,
        blocker: RequestBlocker,
        max_retries: u32,
    ) -> Self {
        Self {
            renderer,
            analyzers,
            blocker,
            max_retries,
            navigation_timeout: NAVIGATION_TIMEOUT,
        }
    }

    /// Overrides the per-attempt navigation timeout
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Fetches a page and returns its analyzed outlinks
    pub async fn crawl_page(&self, url: &Url) -> Result<PageCrawlResult, NetworkError> {
        let page = self.navigate(url).await?;

        let outlinks = extract_outlinks(&page, url, &self.analyzers).map_err(|e| {
            NetworkError::Extraction {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let outlinks_count = outlinks.len();

        tracing::debug!(url = %url, "Extracted {} outlinks", outlinks_count);

        Ok(PageCrawlResult {
            url: url.clone(),
            outlinks,
            outlinks_count,
        })
    }

    async fn navigate(&self, url: &Url) -> Result<RenderedPage, NetworkError> {
        let request = NavigationRequest {
            url,
            timeout: self.navigation_timeout,
            blocker: &self.blocker,
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let outcome =
                match tokio::time::timeout(self.navigation_timeout, self.renderer.render(&request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RenderError::Timeout),
                };

            match outcome {
                Ok(page) => return Ok(page),
                Err(e) if e.is_timeout() && attempt < self.max_retries => {
                    let backoff = RETRY_BACKOFF_STEP * attempt;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        "Navigation timed out, retrying in {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(NetworkError::Navigation {
                        url: url.to_string(),
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Step {
        Hang,
        Fail(RenderError),
        Serve(&'static str),
    }

    /// Replays a fixed script of outcomes, one per render call
    struct ScriptedRenderer {
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<u32>,
    }

    impl ScriptedRenderer {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageRenderer for ScriptedRenderer {
        async fn render(
            &self,
            request: &NavigationRequest<'_>,
        ) -> Result<RenderedPage, RenderError> {
            *self.calls.lock().unwrap() += 1;
            let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Hang);

            match step {
                Step::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Step::Fail(e) => Err(e),
                Step::Serve(html) => Ok(RenderedPage {
                    url: request.url.clone(),
                    final_url: request.url.clone(),
                    status: 200,
                    html: html.to_string(),
                }),
            }
        }
    }

    fn crawler(renderer: Arc<ScriptedRenderer>, max_retries: u32) -> PageCrawler {
        PageCrawler::new(
            renderer,
            AnalyzerRegistry::new(),
            RequestBlocker::default(),
            max_retries,
        )
    }

    fn url() -> Url {
        Url::parse("https://example.org/explore").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_attempt_times_out() {
        let renderer = ScriptedRenderer::new(vec![Step::Hang, Step::Hang, Step::Hang]);
        let start = tokio::time::Instant::now();

        let err = crawler(renderer.clone(), 3)
            .crawl_page(&url())
            .await
            .unwrap_err();

        assert_eq!(renderer.calls(), 3);
        assert!(matches!(err, NetworkError::Navigation { attempts: 3, .. }));
        assert_eq!(err.url(), "https://example.org/explore");
        // Three navigation timeouts plus backoffs of 2s and 4s
        assert_eq!(start.elapsed(), NAVIGATION_TIMEOUT * 3 + Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_succeeds() {
        let renderer = ScriptedRenderer::new(vec![
            Step::Hang,
            Step::Serve(r#"<a href="/a">A</a><a href="/b">B</a>"#),
        ]);

        let result = crawler(renderer.clone(), 3).crawl_page(&url()).await.unwrap();

        assert_eq!(renderer.calls(), 2);
        assert_eq!(result.outlinks_count, 2);
        assert_eq!(result.outlinks.len(), 2);
        assert_eq!(result.url, url());
    }

    #[tokio::test(start_paused = true)]
    async fn test_renderer_reported_timeout_is_retried() {
        let renderer = ScriptedRenderer::new(vec![
            Step::Fail(RenderError::Timeout),
            Step::Serve("<p>no links</p>"),
        ]);

        let result = crawler(renderer.clone(), 2).crawl_page(&url()).await.unwrap();
        assert_eq!(renderer.calls(), 2);
        assert_eq!(result.outlinks_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_timeout_error_fails_immediately() {
        let renderer = ScriptedRenderer::new(vec![
            Step::Fail(RenderError::Http { status: 500 }),
            Step::Serve("<a href='/never'>never</a>"),
        ]);

        let err = crawler(renderer.clone(), 3)
            .crawl_page(&url())
            .await
            .unwrap_err();

        assert_eq!(renderer.calls(), 1);
        assert!(matches!(err, NetworkError::Navigation { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget() {
        let renderer = ScriptedRenderer::new(vec![Step::Hang]);
        let err = crawler(renderer.clone(), 1)
            .crawl_page(&url())
            .await
            .unwrap_err();

        assert_eq!(renderer.calls(), 1);
        assert!(matches!(err, NetworkError::Navigation { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_navigation_timeout() {
        let renderer = ScriptedRenderer::new(vec![Step::Hang]);
        let start = tokio::time::Instant::now();

        crawler(renderer, 1)
            .with_navigation_timeout(Duration::from_millis(250))
            .crawl_page(&url())
            .await
            .unwrap_err();

        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_extraction_failure() {
        let renderer = ScriptedRenderer::new(vec![Step::Serve("<a href='/x'>x</a>")]);
        let opaque = Url::parse("data:text/html,hi").unwrap();

        let err = crawler(renderer, 3).crawl_page(&opaque).await.unwrap_err();
        assert!(matches!(err, NetworkError::Extraction { .. }));
    }
}
