//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierState`: BFS traversal state (visited set plus the pending FIFO queue)
//! - `LinkGraph`: the crawl's output artifact, page URL to discovered outlinks
//! - `OutlinkRecord`: one anchor found on a crawled page

mod frontier;
mod link_graph;

// Re-export main types
pub use frontier::FrontierState;
pub use link_graph::{AnalysisResults, LinkGraph, OutlinkRecord};
