//! Crawl statistics
//!
//! Collected by the coordinator while the crawl runs and printed as a
//! console summary once it finishes.

use crate::state::LinkGraph;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every discovered in-scope URL was visited
    FrontierExhausted,

    /// The visited set reached `page_limit`
    PageLimitReached,

    /// An interrupt (Ctrl-C) was received
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::PageLimitReached => "page limit reached",
            Self::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlStatistics {
    pub seed_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stop_reason: StopReason,

    /// Pages fetched or attempted
    pub pages_visited: usize,

    /// Pages with a link graph entry
    pub pages_crawled: usize,

    /// Pages whose crawl failed (visited, no link graph entry)
    pub pages_failed: usize,

    /// URLs still waiting in the frontier when the crawl stopped
    pub pages_pending: usize,

    pub total_outlinks: usize,
    pub external_outlinks: usize,
}

impl CrawlStatistics {
    /// Fills in the link counts from the final graph
    pub fn with_graph_counts(mut self, graph: &LinkGraph) -> Self {
        self.total_outlinks = graph.total_outlinks();
        self.external_outlinks = graph
            .iter()
            .flat_map(|(_, outlinks)| outlinks)
            .filter(|outlink| outlink.is_external)
            .count();
        self
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of visited pages that were crawled successfully
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_crawled as f64 / self.pages_visited as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seed URL: {}", stats.seed_url);
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!(
        "  Finished: {} ({}s)",
        stats.finished_at.to_rfc3339(),
        stats.duration_seconds()
    );
    println!("  Stopped because: {}", stats.stop_reason);
    println!();

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Crawled: {}", stats.pages_crawled);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Still pending: {}", stats.pages_pending);
    println!();

    println!("Links:");
    println!("  Total outlinks: {}", stats.total_outlinks);
    println!("  External outlinks: {}", stats.external_outlinks);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully crawled)",
        stats.success_rate(),
        stats.pages_crawled,
        stats.pages_visited
    );
}
