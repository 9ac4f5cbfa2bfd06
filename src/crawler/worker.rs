//! Crawl worker: the fetch, extract, requeue loop
//!
//! Each worker repeats, independently of the others:
//! 1. Stop if the page budget is reached
//! 2. Take the next job from the frontier (waiting if needed)
//! 3. Discard it if its URL is probably visited
//! 4. Fetch its links, retrying transient failures up to `max_tries`
//! 5. Mark it visited and count the page
//! 6. Emit every edge and enqueue the admissible links

use crate::config::CrawlerConfig;
use crate::crawler::admission::{Admission, AdmissionPolicy};
use crate::crawler::fetcher::LinkFetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::job::Job;
use crate::output::{CrawlStats, EdgeSink};
use crate::state::{PageCounter, VisitedFilter};
use crate::url::same_host;
use crate::RippleError;
use std::sync::Arc;
use url::Url;

/// State shared by every worker of one engine
pub struct CrawlContext {
    pub frontier: Frontier,
    pub visited: VisitedFilter,
    pub counter: PageCounter,
    pub stats: CrawlStats,
    pub fetcher: Arc<dyn LinkFetcher>,
    pub sink: Arc<dyn EdgeSink>,
    pub policy: AdmissionPolicy,
    pub max_tries: u32,
    pub stop_when_idle: bool,
}

impl CrawlContext {
    /// Builds fresh shared state for one crawl
    ///
    /// The configuration is expected to be validated already; only the
    /// visited filter sizing can still fail here.
    pub fn new(
        config: &CrawlerConfig,
        fetcher: Arc<dyn LinkFetcher>,
        sink: Arc<dyn EdgeSink>,
    ) -> Result<Self, RippleError> {
        Ok(Self {
            frontier: Frontier::new(),
            visited: VisitedFilter::new(config.filter_capacity(), config.false_positive_rate)?,
            counter: PageCounter::new(config.max_pages),
            stats: CrawlStats::new(),
            fetcher,
            sink,
            policy: AdmissionPolicy::new(config.max_depth, config.external_links),
            max_tries: config.max_tries,
            stop_when_idle: config.stop_when_idle,
        })
    }

    /// Admits a depth-0 job for `url` unless it is probably visited
    pub fn seed(&self, url: Url) -> bool {
        if self.visited.probably_contains(url.as_str()) {
            tracing::debug!("Seed {} already visited, skipping", url);
            return false;
        }
        self.submit(Job::seed(url))
    }

    /// Pushes a job onto the frontier
    pub fn submit(&self, job: Job) -> bool {
        let accepted = self.frontier.push(job);
        if accepted {
            self.stats.record_enqueued();
        }
        accepted
    }
}

/// What happened to one dequeued job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// URL probably visited; the job was discarded unfetched
    Skipped,
    /// Fetched and processed
    Processed { links: usize, admitted: usize },
    /// Transient failure; re-enqueued with the new try count
    Retried { tries: u32 },
    /// Transient failure with the retry budget spent
    Dropped { tries: u32 },
    /// Permanent failure; URL marked visited
    Failed,
}

/// One crawl worker
pub struct Worker {
    id: usize,
    ctx: Arc<CrawlContext>,
}

impl Worker {
    pub fn new(id: usize, ctx: Arc<CrawlContext>) -> Self {
        Self { id, ctx }
    }

    /// Runs the crawl loop until the budget is reached or the frontier closes
    ///
    /// Returns the number of pages this worker processed.
    pub async fn run(self) -> usize {
        tracing::debug!("Worker {} started", self.id);
        let mut processed = 0;

        loop {
            if self.ctx.counter.is_exhausted() {
                break;
            }

            let Some(job) = self.ctx.frontier.pop().await else {
                break;
            };

            if let JobOutcome::Processed { .. } = self.process(job).await {
                processed += 1;
            }

            let remaining = self.ctx.frontier.complete();
            if remaining == 0 && self.ctx.stop_when_idle && self.ctx.frontier.close() {
                tracing::info!(
                    "Frontier exhausted after {} pages, stopping workers",
                    self.ctx.counter.get()
                );
            }
        }

        tracing::debug!("Worker {} finished ({} pages)", self.id, processed);
        processed
    }

    /// Processes a single job
    ///
    /// Never fails: every error is resolved here into a `JobOutcome`.
    pub async fn process(&self, mut job: Job) -> JobOutcome {
        let ctx = &self.ctx;

        if ctx.visited.probably_contains(job.url().as_str()) {
            ctx.stats.record_skipped();
            return JobOutcome::Skipped;
        }

        tracing::debug!("Worker {} fetching {} (depth {})", self.id, job.url(), job.depth());

        let fetched = ctx.fetcher.fetch_links(job.url()).await;
        let links = match fetched {
            Ok(links) => links,
            Err(e) if e.is_transient() => {
                let tries = job.record_failure();
                if tries < ctx.max_tries {
                    let url = job.url().clone();
                    if ctx.frontier.push(job) {
                        tracing::debug!("Retrying {} (try {}): {}", url, tries, e);
                        ctx.stats.record_retried();
                        return JobOutcome::Retried { tries };
                    }
                    tracing::debug!("Frontier closed, dropping retry of {}: {}", url, e);
                    ctx.stats.record_dropped();
                    return JobOutcome::Dropped { tries };
                }
                tracing::warn!("Giving up on {} after {} tries: {}", job.url(), tries, e);
                ctx.stats.record_dropped();
                return JobOutcome::Dropped { tries };
            }
            Err(e) => {
                tracing::debug!("Permanent failure for {}: {}", job.url(), e);
                ctx.visited.add(job.url().as_str());
                ctx.stats.record_failed();
                return JobOutcome::Failed;
            }
        };

        ctx.visited.add(job.url().as_str());
        ctx.stats.record_processed();
        let count = ctx.counter.increment();
        if count >= ctx.counter.budget() && ctx.frontier.close() {
            tracing::info!("Page budget of {} reached, stopping workers", ctx.counter.budget());
        }

        let admitted = self.handle_discovered_links(&job, &links);
        JobOutcome::Processed {
            links: links.len(),
            admitted,
        }
    }

    /// Emits every edge and enqueues the admissible links
    ///
    /// Returns the number of jobs enqueued.
    fn handle_discovered_links(&self, job: &Job, links: &[Url]) -> usize {
        let ctx = &self.ctx;
        let mut admitted = 0;

        for link in links {
            match ctx.sink.emit(job.url(), link) {
                Ok(()) => ctx.stats.record_edge(),
                Err(e) => tracing::warn!("Failed to emit edge {} -> {}: {}", job.url(), link, e),
            }

            let internal = same_host(job.url(), link);
            let probably_visited = ctx.visited.probably_contains(link.as_str());

            match ctx.policy.admit(job, link, internal, probably_visited) {
                Admission::Enqueue(next) => {
                    if ctx.submit(next) {
                        admitted += 1;
                    }
                }
                skipped => tracing::trace!("Not enqueuing {}: {:?}", link, skipped),
            }
        }

        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalLinkPolicy;
    use crate::crawler::testing::{Reply, ScriptedFetcher};
    use crate::output::MemorySink;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn config(max_pages: usize, max_depth: u32, max_tries: u32) -> CrawlerConfig {
        CrawlerConfig {
            max_pages,
            max_tries,
            max_depth,
            workers: 1,
            ..CrawlerConfig::default()
        }
    }

    fn context(
        config: &CrawlerConfig,
        fetcher: ScriptedFetcher,
    ) -> (Arc<CrawlContext>, Arc<ScriptedFetcher>, Arc<MemorySink>) {
        let fetcher = Arc::new(fetcher);
        let sink = Arc::new(MemorySink::new());
        let ctx = CrawlContext::new(config, fetcher.clone(), sink.clone()).unwrap();
        (Arc::new(ctx), fetcher, sink)
    }

    fn edge_strings(sink: &MemorySink) -> Vec<(String, String)> {
        sink.edges()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_success_marks_visited_and_emits_edges() {
        let fetcher = ScriptedFetcher::new().page(
            "http://a.test/",
            &["http://a.test/x", "http://b.test/"],
        );
        let (ctx, _, sink) = context(&config(10, 1, 2), fetcher);
        let worker = Worker::new(0, ctx.clone());

        let outcome = worker.process(Job::seed(url("http://a.test/"))).await;

        assert_eq!(outcome, JobOutcome::Processed { links: 2, admitted: 2 });
        assert!(ctx.visited.probably_contains("http://a.test/"));
        assert_eq!(ctx.counter.get(), 1);
        assert_eq!(
            edge_strings(&sink),
            vec![
                ("http://a.test/".to_string(), "http://a.test/x".to_string()),
                ("http://a.test/".to_string(), "http://b.test/".to_string()),
            ]
        );

        let internal = ctx.frontier.try_pop().unwrap();
        assert_eq!(internal, Job::at_depth(url("http://a.test/x"), 1));
        let external = ctx.frontier.try_pop().unwrap();
        assert_eq!(external, Job::seed(url("http://b.test/")));
    }

    #[tokio::test]
    async fn test_visited_job_is_skipped_without_fetch() {
        let fetcher = ScriptedFetcher::new().page("http://a.test/", &[]);
        let (ctx, fetcher, _) = context(&config(10, 1, 2), fetcher);
        ctx.visited.add("http://a.test/");

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(outcome, JobOutcome::Skipped);
        assert_eq!(fetcher.calls("http://a.test/"), 0);
        assert_eq!(ctx.counter.get(), 0);
    }

    #[tokio::test]
    async fn test_depth_limit_emits_but_does_not_enqueue() {
        let fetcher = ScriptedFetcher::new().page(
            "http://a.test/x",
            &["http://a.test/y", "http://c.test/"],
        );
        let (ctx, _, sink) = context(&config(10, 1, 2), fetcher);

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::at_depth(url("http://a.test/x"), 1))
            .await;

        assert_eq!(outcome, JobOutcome::Processed { links: 2, admitted: 1 });
        assert_eq!(sink.len(), 2);
        assert_eq!(ctx.frontier.try_pop().unwrap(), Job::seed(url("http://c.test/")));
        assert!(ctx.frontier.try_pop().is_none());
    }

    #[tokio::test]
    async fn test_visited_links_are_emitted_but_not_enqueued() {
        let fetcher = ScriptedFetcher::new().page("http://a.test/", &["http://a.test/seen"]);
        let (ctx, _, sink) = context(&config(10, 3, 2), fetcher);
        ctx.visited.add("http://a.test/seen");

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(outcome, JobOutcome::Processed { links: 1, admitted: 0 });
        assert_eq!(sink.len(), 1);
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_requeues_same_job() {
        let fetcher = ScriptedFetcher::new().script(
            "http://a.test/",
            vec![Reply::Transient, Reply::Links(vec!["http://b.test/".to_string()])],
        );
        let (ctx, _, sink) = context(&config(10, 1, 2), fetcher);
        let worker = Worker::new(0, ctx.clone());

        let outcome = worker.process(Job::at_depth(url("http://a.test/"), 1)).await;
        assert_eq!(outcome, JobOutcome::Retried { tries: 1 });
        assert!(!ctx.visited.probably_contains("http://a.test/"));
        assert!(sink.is_empty());

        let requeued = ctx.frontier.try_pop().unwrap();
        assert_eq!(requeued.url().as_str(), "http://a.test/");
        assert_eq!(requeued.depth(), 1);
        assert_eq!(requeued.tries(), 1);

        let outcome = worker.process(requeued).await;
        assert_eq!(outcome, JobOutcome::Processed { links: 1, admitted: 1 });
        assert!(ctx.visited.probably_contains("http://a.test/"));
        assert_eq!(sink.len(), 1);
        assert_eq!(ctx.counter.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_drops_without_marking_visited() {
        let fetcher = ScriptedFetcher::new().script("http://a.test/", vec![Reply::Transient]);
        let (ctx, fetcher, _) = context(&config(10, 1, 3), fetcher);
        let worker = Worker::new(0, ctx.clone());

        let mut job = Job::seed(url("http://a.test/"));
        let mut outcomes = Vec::new();
        loop {
            let outcome = worker.process(job).await;
            outcomes.push(outcome.clone());
            match ctx.frontier.try_pop() {
                Some(next) => job = next,
                None => break,
            }
        }

        assert_eq!(
            outcomes,
            vec![
                JobOutcome::Retried { tries: 1 },
                JobOutcome::Retried { tries: 2 },
                JobOutcome::Dropped { tries: 3 },
            ]
        );
        assert_eq!(fetcher.calls("http://a.test/"), 3);
        assert!(!ctx.visited.probably_contains("http://a.test/"));

        // A later rediscovery starts with a fresh retry budget
        assert!(ctx.seed(url("http://a.test/")));
        assert_eq!(ctx.frontier.try_pop().unwrap().tries(), 0);
    }

    #[tokio::test]
    async fn test_retry_into_closed_frontier_counts_as_dropped() {
        let fetcher = ScriptedFetcher::new().script("http://a.test/", vec![Reply::Transient]);
        let (ctx, _, _) = context(&config(10, 1, 5), fetcher);
        ctx.frontier.close();

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(outcome, JobOutcome::Dropped { tries: 1 });
        assert!(ctx.frontier.is_empty());
        let now = chrono::Utc::now();
        let report = ctx.stats.snapshot(10, now, now);
        assert_eq!(report.jobs_retried, 0);
        assert_eq!(report.jobs_dropped, 1);
    }

    #[tokio::test]
    async fn test_duplicate_fetches_emit_identical_edges() {
        let fetcher = Arc::new(ScriptedFetcher::new().page(
            "http://a.test/",
            &["http://a.test/x", "http://b.test/", "http://a.test/y"],
        ));
        let cfg = config(10, 1, 2);

        // Separate visited sets let the same page through twice
        let first_sink = Arc::new(MemorySink::new());
        let second_sink = Arc::new(MemorySink::new());
        let first = CrawlContext::new(&cfg, fetcher.clone(), first_sink.clone()).unwrap();
        let second = CrawlContext::new(&cfg, fetcher.clone(), second_sink.clone()).unwrap();

        let a = Worker::new(0, Arc::new(first))
            .process(Job::seed(url("http://a.test/")))
            .await;
        let b = Worker::new(1, Arc::new(second))
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(a, JobOutcome::Processed { links: 3, admitted: 3 });
        assert_eq!(a, b);
        assert_eq!(fetcher.calls("http://a.test/"), 2);

        let expected = vec![
            ("http://a.test/".to_string(), "http://a.test/x".to_string()),
            ("http://a.test/".to_string(), "http://b.test/".to_string()),
            ("http://a.test/".to_string(), "http://a.test/y".to_string()),
        ];
        assert_eq!(edge_strings(&first_sink), expected);
        assert_eq!(edge_strings(&second_sink), expected);
    }

    #[tokio::test]
    async fn test_zero_max_tries_drops_on_first_failure() {
        let fetcher = ScriptedFetcher::new().script("http://a.test/", vec![Reply::Transient]);
        let (ctx, _, _) = context(&config(10, 1, 0), fetcher);

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(outcome, JobOutcome::Dropped { tries: 1 });
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_permanent_failure_marks_visited() {
        let fetcher = ScriptedFetcher::new().script("http://a.test/", vec![Reply::Permanent]);
        let (ctx, fetcher, _) = context(&config(10, 1, 5), fetcher);
        let worker = Worker::new(0, ctx.clone());

        let outcome = worker.process(Job::seed(url("http://a.test/"))).await;
        assert_eq!(outcome, JobOutcome::Failed);
        assert!(ctx.visited.probably_contains("http://a.test/"));
        assert_eq!(ctx.counter.get(), 0);
        assert!(ctx.frontier.is_empty());

        assert!(!ctx.seed(url("http://a.test/")));
        let outcome = worker.process(Job::seed(url("http://a.test/"))).await;
        assert_eq!(outcome, JobOutcome::Skipped);
        assert_eq!(fetcher.calls("http://a.test/"), 1);
    }

    #[tokio::test]
    async fn test_ignore_policy_keeps_edges() {
        let fetcher = ScriptedFetcher::new().page("http://a.test/", &["http://b.test/"]);
        let mut cfg = config(10, 1, 2);
        cfg.external_links = ExternalLinkPolicy::Ignore;
        let (ctx, _, sink) = context(&cfg, fetcher);

        let outcome = Worker::new(0, ctx.clone())
            .process(Job::seed(url("http://a.test/")))
            .await;

        assert_eq!(outcome, JobOutcome::Processed { links: 1, admitted: 0 });
        assert_eq!(sink.len(), 1);
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_at_budget() {
        // a.test/ -> a.test/x (internal), b.test/ (external); further links never matter
        let fetcher = ScriptedFetcher::new()
            .page("http://a.test/", &["http://a.test/x", "http://b.test/"])
            .page("http://a.test/x", &["http://a.test/y"])
            .page("http://b.test/", &["http://b.test/z"])
            .page("http://a.test/y", &[])
            .page("http://b.test/z", &[]);
        let (ctx, fetcher, sink) = context(&config(3, 1, 2), fetcher);
        assert!(ctx.seed(url("http://a.test/")));

        let processed = Worker::new(0, ctx.clone()).run().await;

        assert_eq!(processed, 3);
        assert_eq!(ctx.counter.get(), 3);
        assert!(ctx.frontier.is_closed());
        assert_eq!(fetcher.calls("http://a.test/y"), 0);
        assert_eq!(fetcher.calls("http://b.test/z"), 0);

        let edges = edge_strings(&sink);
        assert!(edges.contains(&("http://a.test/".to_string(), "http://a.test/x".to_string())));
        assert!(edges.contains(&("http://a.test/".to_string(), "http://b.test/".to_string())));
    }

    #[tokio::test]
    async fn test_run_stops_when_frontier_drains() {
        let fetcher = ScriptedFetcher::new()
            .page("http://a.test/", &["http://a.test/x"])
            .page("http://a.test/x", &["http://a.test/"]);
        let (ctx, _, sink) = context(&config(100, 3, 2), fetcher);
        ctx.seed(url("http://a.test/"));

        let processed = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            Worker::new(0, ctx.clone()).run(),
        )
        .await
        .expect("worker did not stop on an exhausted frontier");

        assert_eq!(processed, 2);
        assert_eq!(sink.len(), 2);
        assert!(ctx.frontier.is_closed());
        assert_eq!(ctx.frontier.outstanding(), 0);
    }
}
