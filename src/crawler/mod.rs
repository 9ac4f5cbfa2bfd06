//! Crawler module: the crawl-frontier engine
//!
//! This module contains the core crawling logic, including:
//! - Jobs and the shared frontier queue
//! - The link admission policy (depth and host rules)
//! - The worker loop with retry and requeue handling
//! - Engine lifecycle (seed, start, join, shutdown)
//! - The HTTP link fetcher and HTML link extraction

mod admission;
mod engine;
mod fetcher;
mod frontier;
mod job;
mod parser;
mod worker;

#[cfg(test)]
mod testing;

pub use admission::{Admission, AdmissionPolicy};
pub use engine::{CrawlHandle, Crawler, Progress};
pub use fetcher::{build_http_client, FailureClass, FetchError, HttpLinkFetcher, LinkFetcher};
pub use frontier::Frontier;
pub use job::Job;
pub use parser::extract_links;
pub use worker::{CrawlContext, JobOutcome, Worker};
