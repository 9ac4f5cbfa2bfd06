//! URL handling module for Ripple-Crawl
//!
//! This module provides URL canonicalization and host extraction. Every URL
//! that enters the frontier, the visited filter, or the edge list has been
//! canonicalized here, so host and string comparisons are exact.

mod domain;
mod normalize;

pub use domain::{extract_host, same_host};
pub use normalize::{canonical_url, parse_canonical};
