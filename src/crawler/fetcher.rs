//! Link fetcher interface and HTTP implementation
//!
//! This module handles:
//! - The `LinkFetcher` seam between the crawl engine and the network
//! - Building HTTP clients from the fetcher configuration
//! - Fetching a page and extracting its links
//! - Classifying failures as transient (retry) or permanent (give up)

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Whether a failed fetch is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Network-level trouble; the same URL may succeed later
    Transient,
    /// The page will not yield links no matter how often it is fetched
    Permanent,
}

/// A failed link fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed reading body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Unsupported URL scheme: {url}")]
    UnsupportedScheme { url: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Permanent failure: {0}")]
    Permanent(String),
}

impl FetchError {
    /// Classifies this failure
    ///
    /// | Failure | Class |
    /// |---------|-------|
    /// | Timeout, connection, body read | Transient |
    /// | HTTP 5xx, HTTP 429 | Transient |
    /// | Other HTTP status | Permanent |
    /// | Non-HTML content, unsupported scheme | Permanent |
    /// | Other request errors | Permanent |
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Body { .. } => {
                FailureClass::Transient
            }
            Self::Status { status, .. } => {
                if *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
                    FailureClass::Transient
                } else {
                    FailureClass::Permanent
                }
            }
            Self::Transient(_) => FailureClass::Transient,
            Self::ContentMismatch { .. }
            | Self::UnsupportedScheme { .. }
            | Self::Request { .. }
            | Self::Permanent(_) => FailureClass::Permanent,
        }
    }

    /// Returns true if the job should be retried
    pub fn is_transient(&self) -> bool {
        self.class() == FailureClass::Transient
    }
}

/// Resolves a URL to the canonical links found on its page
///
/// Implementations must be safe to call from many workers at once.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    async fn fetch_links(&self, url: &Url) -> Result<Vec<Url>, FetchError>;
}

/// Link fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpLinkFetcher {
    client: Client,
}

impl HttpLinkFetcher {
    /// Builds a fetcher from the fetcher configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkFetcher for HttpLinkFetcher {
    async fn fetch_links(&self, url: &Url) -> Result<Vec<Url>, FetchError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        // Relative links resolve against the page we ended up on
        let final_url = response.url().clone();

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(extract_links(&body, &final_url))
    }
}

/// Builds an HTTP client with the configured identity and limits
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Missing Content-Type is given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_reqwest_error(url: &Url, e: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if e.is_timeout() {
        FetchError::Timeout { url }
    } else if e.is_connect() {
        FetchError::Connect {
            url,
            message: e.to_string(),
        }
    } else if e.is_body() {
        FetchError::Body {
            url,
            message: e.to_string(),
        }
    } else {
        FetchError::Request {
            url,
            message: e.to_string(),
        }
    }
}
