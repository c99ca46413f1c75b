//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing the link graph as JSON (intermediate and final)
//! - Writing the flat source/target CSV
//! - Crawl statistics and their console summary

mod files;
pub mod stats;
mod traits;

pub use files::{
    link_graph_csv, write_atomic, FileOutputHandler, FINAL_CSV, FINAL_JSON, INTERMEDIATE_JSON,
};
pub use stats::{print_statistics, CrawlStatistics, StopReason};
pub use traits::{OutputError, OutputHandler, OutputResult};
