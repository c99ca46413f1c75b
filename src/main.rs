//! Site Mapper main entry point
//!
//! This is the command-line interface for the Site Mapper crawler and its
//! offline feature extraction stage.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use site_mapper::config::{load_config_with_hash, Config, LogLevel};
use site_mapper::crawler::crawl;
use site_mapper::features::{
    build_feature_table, load_link_graph, print_label_report, write_feature_table, LabelReport,
};
use site_mapper::output::print_statistics;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Conventional exit status for a process ended by SIGINT
const SIGINT_EXIT_CODE: i32 = 130;

/// Site Mapper: a bounded crawler that tells valuable links from crawler traps
///
/// Crawls one site breadth-first from a seed URL, records every outlink with
/// structural analysis, and writes the link graph as JSON and CSV. The
/// `features` subcommand turns a saved link graph into a labelled feature
/// table.
#[derive(Parser, Debug)]
#[command(name = "site-mapper")]
#[command(version)]
#[command(about = "Maps a site's link structure and flags crawler traps", long_about = None)]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(long, value_name = "URL", required = true)]
    url: Option<Url>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for crawl results (overrides the config file)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// DEBUG, INFO, WARNING or ERROR (overrides the config file)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the labelled feature table from a saved link graph
    Features {
        /// Link graph JSON written by a crawl
        #[arg(long, value_name = "JSON")]
        input: PathBuf,

        /// Where to write the feature table CSV
        #[arg(long, value_name = "CSV")]
        output: PathBuf,

        /// DEBUG, INFO, WARNING or ERROR
        #[arg(long, value_name = "LEVEL", default_value = "INFO")]
        log_level: LogLevel,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Features {
            input,
            output,
            log_level,
        }) => {
            setup_logging(log_level);
            handle_features(&input, &output)
        }
        None => {
            let Some(seed) = cli.url else {
                bail!("--url is required to start a crawl");
            };

            let (mut config, config_hash) = load_crawl_config(&cli.config)?;
            if let Some(output_dir) = cli.output_dir {
                config.output.output_dir = output_dir;
            }
            let log_level = match cli.log_level {
                Some(level) => level,
                None => config.logging.log_level()?,
            };

            setup_logging(log_level);
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                cli.config.display(),
                config_hash
            );

            handle_crawl(config, seed).await
        }
    }
}

/// Sets up the logging/tracing subscriber for the given level
fn setup_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.filter_directive()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads and validates the config file; a missing or unreadable file is fatal
fn load_crawl_config(path: &Path) -> anyhow::Result<(Config, String)> {
    load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: Url) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl from {} (page limit: {}, delay: {}s, allowed hosts: {:?})",
        seed,
        config.crawler.page_limit,
        config.crawler.delay,
        config.crawler.allowed_hosts
    );

    let interrupt = Arc::new(AtomicBool::new(false));
    let signal = interrupt.clone();
    tokio::spawn(async move {
        if watch_interrupts(signal, tokio::signal::ctrl_c).await {
            tracing::error!("Second interrupt received, aborting without saving");
            std::process::exit(SIGINT_EXIT_CODE);
        }
    });

    let output_dir = config.output.output_dir.clone();
    let report = match crawl(config, seed, interrupt).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("Crawl failed");
        }
    };

    tracing::info!("Crawl results written to {}", output_dir.display());
    println!();
    print_statistics(&report.statistics);
    Ok(())
}

/// Sets `interrupt` on the first signal and returns true on the second
///
/// Returns false if the signal source fails before a second signal arrives.
async fn watch_interrupts<F, Fut>(interrupt: Arc<AtomicBool>, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    tracing::warn!(
        "Interrupt received, finishing the current page and saving results \
         (press Ctrl-C again to abort)"
    );
    interrupt.store(true, Ordering::SeqCst);

    next_signal().await.is_ok()
}

/// Handles the `features` subcommand: link graph in, feature table out
fn handle_features(input: &Path, output: &Path) -> anyhow::Result<()> {
    let graph = load_link_graph(input)
        .with_context(|| format!("Failed to load link graph from {}", input.display()))?;
    tracing::info!("Loaded {} crawled pages from {}", graph.len(), input.display());

    let rows = build_feature_table(&graph);
    write_feature_table(output, &rows)
        .with_context(|| format!("Failed to write feature table to {}", output.display()))?;
    tracing::info!("Wrote {} rows to {}", rows.len(), output.display());

    println!();
    print_label_report(&LabelReport::from_rows(&rows));
    Ok(())
}
