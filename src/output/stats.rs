//! Crawl statistics and progress reporting
//!
//! Workers bump the atomic counters in `CrawlStats` as jobs finish; a
//! `CrawlReport` is the frozen snapshot handed back when the crawl ends.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    processed: AtomicU64,
    skipped: AtomicU64,
    retried: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    edges: AtomicU64,
    enqueued: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_edge(&self) {
        self.edges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a report
    pub fn snapshot(
        &self,
        budget: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> CrawlReport {
        CrawlReport {
            budget,
            pages_processed: self.processed.load(Ordering::Relaxed),
            jobs_skipped: self.skipped.load(Ordering::Relaxed),
            jobs_retried: self.retried.load(Ordering::Relaxed),
            jobs_dropped: self.dropped.load(Ordering::Relaxed),
            jobs_failed: self.failed.load(Ordering::Relaxed),
            edges_emitted: self.edges.load(Ordering::Relaxed),
            jobs_enqueued: self.enqueued.load(Ordering::Relaxed),
            started_at,
            finished_at,
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// Configured page budget
    pub budget: usize,
    /// Pages fetched and processed successfully
    pub pages_processed: u64,
    /// Jobs discarded because their URL was probably visited
    pub jobs_skipped: u64,
    /// Transient failures that re-enqueued the job
    pub jobs_retried: u64,
    /// Jobs dropped after exhausting their retry budget
    pub jobs_dropped: u64,
    /// Jobs that failed permanently
    pub jobs_failed: u64,
    /// Edges handed to the output sink
    pub edges_emitted: u64,
    /// Jobs admitted to the frontier, seeds included
    pub jobs_enqueued: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Returns true if the page budget was reached
    pub fn budget_reached(&self) -> bool {
        self.pages_processed >= self.budget as u64
    }
}

/// Prints a crawl report to stdout
///
/// The CLI only calls this when edges are not being written to stdout.
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");
    println!(
        "Pages processed: {} / {}",
        report.pages_processed, report.budget
    );
    println!("Edges emitted: {}", report.edges_emitted);
    println!("Jobs enqueued: {}", report.jobs_enqueued);
    println!("Skipped (already visited): {}", report.jobs_skipped);
    println!("Retried (transient failure): {}", report.jobs_retried);
    println!("Dropped (retries exhausted): {}", report.jobs_dropped);
    println!("Failed (permanent failure): {}", report.jobs_failed);
    println!(
        "Duration: {:.1}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
}

/// Spawns a task that logs "Visited N out of M pages" every `interval`
///
/// `progress` returns `(visited, budget, finished)`; the task exits once
/// `finished` is true. Abort the handle to stop it earlier.
pub fn spawn_progress_reporter<F>(interval: Duration, progress: F) -> JoinHandle<()>
where
    F: Fn() -> (usize, usize, bool) + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let (visited, budget, finished) = progress();
            if finished {
                break;
            }
            tracing::info!("Visited {} out of {} pages.", visited, budget);
        }
    })
}
