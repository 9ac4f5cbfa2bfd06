//! Output module for edge emission and crawl reporting
//!
//! This module handles:
//! - The `EdgeSink` interface that receives every discovered edge
//! - A TSV writer sink for files and stdout
//! - An in-memory sink for library callers and tests
//! - Crawl statistics, the final report, and periodic progress logging

mod memory;
pub mod stats;
mod traits;
mod tsv;

pub use memory::MemorySink;
pub use stats::{print_report, spawn_progress_reporter, CrawlReport, CrawlStats};
pub use traits::{EdgeSink, OutputError, OutputResult};
pub use tsv::TsvSink;
