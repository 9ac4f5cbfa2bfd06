//! Scripted link fetcher for driving workers without a network

use crate::crawler::fetcher::{FetchError, LinkFetcher};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Links(Vec<String>),
    Transient,
    Permanent,
}

type Fallback = Box<dyn Fn(&Url) -> Vec<Url> + Send + Sync>;

/// Replies are consumed in order per URL; the last one repeats forever
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    pages: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
    fallback: Option<Fallback>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|s| s.to_string()).collect();
        self.script(url, vec![Reply::Links(links)])
    }

    pub(crate) fn script(self, url: &str, replies: Vec<Reply>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
        self
    }

    pub(crate) fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&Url) -> Vec<Url> + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut pages = self.pages.lock().unwrap();
        let replies = pages.get_mut(url)?;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

#[async_trait]
impl LinkFetcher for ScriptedFetcher {
    async fn fetch_links(&self, url: &Url) -> Result<Vec<Url>, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.as_str().to_string())
            .or_insert(0) += 1;

        match self.next_reply(url.as_str()) {
            Some(Reply::Links(links)) => Ok(links
                .iter()
                .map(|l| Url::parse(l).unwrap())
                .collect()),
            Some(Reply::Transient) => Err(FetchError::Transient(format!("flaky {}", url))),
            Some(Reply::Permanent) => Err(FetchError::Permanent(format!("broken {}", url))),
            None => match &self.fallback {
                Some(fallback) => Ok(fallback(url)),
                None => Err(FetchError::Permanent(format!("no page at {}", url))),
            },
        }
    }
}
