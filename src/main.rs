//! Ripple-Crawl main entry point
//!
//! Reads seed URLs (one per line) from stdin, crawls until the page budget
//! is reached or the frontier is exhausted, and writes the discovered edge
//! list as `source<TAB>dest` lines to stdout or a file.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config, ExternalLinkPolicy};
use ripple_crawl::output::{print_report, spawn_progress_reporter};
use ripple_crawl::{Crawler, EdgeSink, HttpLinkFetcher, TsvSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: bounded, concurrent link discovery
///
/// Seeds are read from stdin. Every discovered link is written as an edge;
/// same-host links are followed up to MAX_DEPTH, links to other hosts start
/// a fresh depth budget.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "Bounded, concurrent link-discovery crawler", long_about = None)]
struct Cli {
    /// Number of pages to process before stopping
    #[arg(value_name = "MAX_PAGES")]
    max_pages: Option<usize>,

    /// Fetch attempts per page before a failing page is dropped
    #[arg(value_name = "MAX_TRIES")]
    max_tries: Option<u32>,

    /// Maximum same-host link depth
    #[arg(value_name = "MAX_DEPTH")]
    max_depth: Option<u32>,

    /// Edge list destination ("-" for stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Admission of links to other hosts: reset, increment or ignore
    #[arg(long, value_name = "POLICY")]
    external_links: Option<ExternalLinkPolicy>,

    /// Keep waiting for work when the frontier runs dry instead of stopping
    #[arg(long)]
    keep_waiting: bool,

    /// Seconds between progress reports
    #[arg(long, value_name = "SECS")]
    progress_interval: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    run(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout may be carrying the edge list.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_tries) = cli.max_tries {
        config.crawler.max_tries = max_tries;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(policy) = cli.external_links {
        config.crawler.external_links = policy;
    }
    if cli.keep_waiting {
        config.crawler.stop_when_idle = false;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(secs) = cli.progress_interval {
        config.output.progress_interval_secs = secs;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the main crawl operation
async fn run(config: Config) -> anyhow::Result<()> {
    let to_stdout = config.output.is_stdout();
    let sink: Arc<dyn EdgeSink> = if to_stdout {
        Arc::new(TsvSink::stdout())
    } else {
        let path = Path::new(config.output.path.trim());
        Arc::new(
            TsvSink::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        )
    };

    let fetcher =
        Arc::new(HttpLinkFetcher::new(&config.fetcher).context("failed to build HTTP client")?);
    let mut crawler = Crawler::new(config.crawler.clone(), fetcher, sink)?;

    let admitted = read_seeds(&crawler).await?;
    if admitted == 0 {
        bail!("no seed URLs admitted; provide absolute http(s) URLs on stdin, one per line");
    }
    tracing::info!("Admitted {} seed URLs", admitted);

    let handle = crawler.handle();
    let reporter = {
        let handle = handle.clone();
        spawn_progress_reporter(
            Duration::from_secs(config.output.progress_interval_secs),
            move || {
                let progress = handle.progress();
                (progress.visited, progress.budget, progress.finished)
            },
        )
    };

    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing in-flight pages");
                handle.shutdown();
            }
        });
    }

    crawler.start();
    let report = crawler.join().await?;
    reporter.abort();

    if to_stdout {
        tracing::info!(
            "Visited {} out of {} pages, {} edges. Done.",
            report.pages_processed,
            report.budget,
            report.edges_emitted
        );
    } else {
        print_report(&report);
        println!("Done.");
    }

    Ok(())
}

/// Reads seed URLs from stdin until EOF
///
/// Returns the number of seeds admitted to the frontier.
async fn read_seeds(crawler: &Crawler) -> anyhow::Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut admitted = 0;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match crawler.crawl(line) {
            Ok(true) => admitted += 1,
            Ok(false) => tracing::debug!("Seed {} already visited", line),
            Err(e) => tracing::warn!("Skipping seed {}: {}", line, e),
        }
    }

    Ok(admitted)
}
