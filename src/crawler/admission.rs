//! Link admission policy
//!
//! Decides, for one discovered link, whether a new job is enqueued and at
//! what depth. Depth limits bound how far a crawl wanders inside one host;
//! how cross-host links are treated is set by [`ExternalLinkPolicy`].

use crate::config::ExternalLinkPolicy;
use crate::crawler::job::Job;
use url::Url;

/// Why a discovered link was or was not admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Enqueue a new job for the link
    Enqueue(Job),
    /// The link is probably visited already
    AlreadyVisited,
    /// Same-host link from a job at the depth limit
    DepthExceeded,
    /// Cross-host link under [`ExternalLinkPolicy::Ignore`]
    ExternalIgnored,
}

/// Admission rules fixed for the engine's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub max_depth: u32,
    pub external_links: ExternalLinkPolicy,
}

impl AdmissionPolicy {
    pub fn new(max_depth: u32, external_links: ExternalLinkPolicy) -> Self {
        Self {
            max_depth,
            external_links,
        }
    }

    /// Decides admission of `link`, found on the page of `source`
    ///
    /// # Rules
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | link probably visited | AlreadyVisited |
    /// | internal, depth < max | Enqueue at depth + 1 |
    /// | internal, depth >= max | DepthExceeded |
    /// | external, `reset` | Enqueue at depth 0 |
    /// | external, `increment` | same as internal |
    /// | external, `ignore` | ExternalIgnored |
    pub fn admit(&self, source: &Job, link: &Url, internal: bool, probably_visited: bool) -> Admission {
        if probably_visited {
            return Admission::AlreadyVisited;
        }

        if internal {
            return self.next_depth(source, link);
        }

        match self.external_links {
            ExternalLinkPolicy::Reset => Admission::Enqueue(Job::seed(link.clone())),
            ExternalLinkPolicy::Increment => self.next_depth(source, link),
            ExternalLinkPolicy::Ignore => Admission::ExternalIgnored,
        }
    }

    fn next_depth(&self, source: &Job, link: &Url) -> Admission {
        if source.depth() < self.max_depth {
            Admission::Enqueue(Job::at_depth(link.clone(), source.depth() + 1))
        } else {
            Admission::DepthExceeded
        }
    }
}
