//! Page rendering
//!
//! A `PageRenderer` turns a URL into the HTML document a crawler would see.
//! The production implementation is a plain HTTP fetcher:
//! - One `reqwest::Client` per crawl (the crawl session)
//! - Redirects followed manually (max 10 hops) so every hop passes the
//!   request blocker
//! - Content-Type checked before the body is read
//! - Client timeouts reported as `RenderError::Timeout`

use crate::config::CrawlerConfig;
use crate::url::matches_host_pattern;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirect hops followed for a single navigation
pub const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("site-mapper/", env!("CARGO_PKG_VERSION"));

/// Errors a single navigation attempt can end with
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation timed out")]
    Timeout,

    #[error("Request to blocked host aborted: {url}")]
    Blocked { url: String },

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Expected HTML, got '{content_type}'")]
    ContentMismatch { content_type: String },

    #[error("Redirect error: {0}")]
    Redirect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl RenderError {
    /// Timeouts are the only transient failure; everything else is final
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for RenderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Aborts requests whose target host matches a blocklist pattern
#[derive(Debug, Clone, Default)]
pub struct RequestBlocker {
    patterns: Vec<String>,
}

impl RequestBlocker {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.blocked_hosts.iter().cloned())
    }

    /// Returns true if a request to this URL must not be made
    pub fn is_blocked(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| {
                self.patterns
                    .iter()
                    .any(|pattern| matches_host_pattern(pattern, host))
            })
            .unwrap_or(false)
    }
}

/// One navigation to perform
#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub url: &'a Url,
    pub timeout: Duration,
    pub blocker: &'a RequestBlocker,
}

/// A successfully loaded HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// The URL that was requested
    pub url: Url,

    /// Where the page was finally served from, after redirects
    pub final_url: Url,

    pub status: u16,

    pub html: String,
}

/// Loads pages for the crawler
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, request: &NavigationRequest<'_>) -> Result<RenderedPage, RenderError>;
}

/// Builds the HTTP client used for a crawl session
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageRenderer` backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, request: &NavigationRequest<'_>) -> Result<RenderedPage, RenderError> {
        let mut current = request.url.clone();
        let mut seen = HashSet::new();

        for _ in 0..=MAX_REDIRECTS {
            if request.blocker.is_blocked(&current) {
                return Err(RenderError::Blocked {
                    url: current.to_string(),
                });
            }

            if !seen.insert(current.clone()) {
                return Err(RenderError::Redirect(format!(
                    "redirect loop detected at {}",
                    current
                )));
            }

            let response = self
                .client
                .get(current.clone())
                .timeout(request.timeout)
                .send()
                .await?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        RenderError::Redirect(format!("{} without Location header", status))
                    })?;

                current = current.join(location).map_err(|e| {
                    RenderError::Redirect(format!("invalid Location '{}': {}", location, e))
                })?;
                tracing::debug!("Following redirect to {}", current);
                continue;
            }

            if !status.is_success() {
                return Err(RenderError::Http {
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if !is_html(&content_type) {
                return Err(RenderError::ContentMismatch { content_type });
            }

            let html = response.text().await?;

            return Ok(RenderedPage {
                url: request.url.clone(),
                final_url: current,
                status: status.as_u16(),
                html,
            });
        }

        Err(RenderError::Redirect(format!(
            "more than {} redirects",
            MAX_REDIRECTS
        )))
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type.to_ascii_lowercase();
    mime.contains("text/html") || mime.contains("application/xhtml+xml")
}
