//! HTML link extraction
//!
//! Parses a fetched page and returns its outbound links as canonical,
//! absolute URLs, de-duplicated and in document order.

use crate::url::canonical_url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` resolved against `base_url`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an HTTP(S) URL with a host
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page#top">Link</a></body></html>"#;
/// let base_url = Url::parse("https://Example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(link) = resolve_link(href, base_url) {
                if seen.insert(link.as_str().to_string()) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves a link href to a canonical absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match canonical_url(&absolute) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::trace!("Dropping link {}: {}", absolute, e);
            None
        }
    }
}
