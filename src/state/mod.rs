//! State module for process-wide crawl state
//!
//! Both structures are created once per engine, shared by reference between
//! all workers, and never reset while the engine runs.
//!
//! # Components
//!
//! - `VisitedFilter`: probabilistic set of URLs already processed
//! - `PageCounter`: atomic count of successfully processed pages

mod counter;
mod visited;

// Re-export main types
pub use counter::PageCounter;
pub use visited::VisitedFilter;
