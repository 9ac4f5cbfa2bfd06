//! Crawl engine - lifecycle of the shared state and the worker pool
//!
//! Construction only builds state; nothing runs until `start`. This keeps
//! seeding, starting and joining explicit:
//!
//! ```no_run
//! use ripple_crawl::config::CrawlerConfig;
//! use ripple_crawl::{Crawler, HttpLinkFetcher, MemorySink};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpLinkFetcher::new(&Default::default())?);
//! let sink = Arc::new(MemorySink::new());
//! let mut crawler = Crawler::new(CrawlerConfig::default(), fetcher, sink.clone())?;
//! crawler.crawl("https://example.com/")?;
//! crawler.start();
//! let report = crawler.join().await?;
//! println!("{} pages, {} edges", report.pages_processed, sink.len());
//! # Ok(())
//! # }
//! ```

use crate::config::{validate_crawler_config, CrawlerConfig};
use crate::crawler::fetcher::LinkFetcher;
use crate::crawler::worker::{CrawlContext, Worker};
use crate::output::{CrawlReport, EdgeSink};
use crate::url::{canonical_url, parse_canonical};
use crate::{RippleError, UrlError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Point-in-time view of crawl progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Pages processed so far
    pub visited: usize,
    /// Page budget
    pub budget: usize,
    /// Jobs waiting in the frontier
    pub queued: usize,
    /// True once the frontier is closed
    pub finished: bool,
}

/// Cloneable handle for seeding and monitoring a running crawl
#[derive(Clone)]
pub struct CrawlHandle {
    ctx: Arc<CrawlContext>,
}

impl CrawlHandle {
    /// Submits a seed URL; see [`Crawler::crawl`]
    pub fn crawl(&self, url: &str) -> Result<bool, UrlError> {
        let url = parse_canonical(url)?;
        Ok(self.ctx.seed(url))
    }

    /// Submits an already parsed seed URL
    pub fn crawl_url(&self, url: &Url) -> Result<bool, UrlError> {
        let url = canonical_url(url)?;
        Ok(self.ctx.seed(url))
    }

    /// Current progress
    pub fn progress(&self) -> Progress {
        Progress {
            visited: self.ctx.counter.get(),
            budget: self.ctx.counter.budget(),
            queued: self.ctx.frontier.len(),
            finished: self.ctx.frontier.is_closed(),
        }
    }

    /// Stops the crawl: waiting workers wake and exit, busy workers exit
    /// after their current fetch
    pub fn shutdown(&self) {
        if self.ctx.frontier.close() {
            tracing::info!("Crawl shutdown requested");
        }
    }
}

/// Bounded, concurrent crawl engine
pub struct Crawler {
    config: CrawlerConfig,
    ctx: Arc<CrawlContext>,
    workers: Vec<JoinHandle<usize>>,
    started_at: Option<DateTime<Utc>>,
}

impl Crawler {
    /// Creates an engine with fresh shared state
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Engine ready for seeding
    /// * `Err(RippleError)` - Invalid configuration or unsizable visited filter
    pub fn new(
        config: CrawlerConfig,
        fetcher: Arc<dyn LinkFetcher>,
        sink: Arc<dyn EdgeSink>,
    ) -> Result<Self, RippleError> {
        validate_crawler_config(&config)?;
        let ctx = CrawlContext::new(&config, fetcher, sink)?;

        Ok(Self {
            config,
            ctx: Arc::new(ctx),
            workers: Vec::new(),
            started_at: None,
        })
    }

    /// Submits a seed URL at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Enqueued
    /// * `Ok(false)` - Probably visited already, or the crawl is finished
    /// * `Err(UrlError)` - Malformed or non-HTTP(S) URL; nothing enqueued
    pub fn crawl(&self, url: &str) -> Result<bool, UrlError> {
        self.handle().crawl(url)
    }

    /// Submits an already parsed seed URL at depth 0
    pub fn crawl_url(&self, url: &Url) -> Result<bool, UrlError> {
        self.handle().crawl_url(url)
    }

    /// Handle usable from other tasks while the crawl runs
    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Spawns the worker tasks
    ///
    /// Must be called from within a tokio runtime. Calling it again is a no-op.
    /// With `stop_when_idle`, starting without any admitted seed finishes the
    /// crawl at once.
    pub fn start(&mut self) {
        if self.started_at.is_some() {
            return;
        }

        if self.ctx.stop_when_idle && self.ctx.frontier.outstanding() == 0 {
            tracing::warn!("No seeds admitted, nothing to crawl");
            self.ctx.frontier.close();
        }

        tracing::info!(
            "Starting {} workers (budget {} pages, max depth {}, max tries {})",
            self.config.workers,
            self.config.max_pages,
            self.config.max_depth,
            self.config.max_tries
        );

        self.started_at = Some(Utc::now());
        self.workers = (0..self.config.workers)
            .map(|id| tokio::spawn(Worker::new(id, Arc::clone(&self.ctx)).run()))
            .collect();
    }

    /// Returns true once `start` has been called
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Current progress
    pub fn progress(&self) -> Progress {
        self.handle().progress()
    }

    /// Stops the crawl; see [`CrawlHandle::shutdown`]
    pub fn shutdown(&self) {
        self.handle().shutdown();
    }

    /// Waits for every worker to finish and returns the crawl report
    ///
    /// The sink is flushed once all workers are done. An engine that was
    /// never started returns an empty report immediately.
    pub async fn join(self) -> Result<CrawlReport, RippleError> {
        let started_at = self.started_at.unwrap_or_else(Utc::now);
        let mut failure = None;

        for (id, handle) in self.workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
                failure.get_or_insert(RippleError::Worker {
                    id,
                    message: e.to_string(),
                });
            }
        }

        // Late seeds must not be accepted into a crawl nobody serves
        self.ctx.frontier.close();
        self.ctx.sink.flush()?;

        if let Some(e) = failure {
            return Err(e);
        }

        let report = self
            .ctx
            .stats
            .snapshot(self.config.max_pages, started_at, Utc::now());
        tracing::info!(
            "Crawl completed: {} pages processed, {} edges emitted",
            report.pages_processed,
            report.edges_emitted
        );
        Ok(report)
    }

    /// Starts the workers and waits for them
    pub async fn run(mut self) -> Result<CrawlReport, RippleError> {
        self.start();
        self.join().await
    }
}
