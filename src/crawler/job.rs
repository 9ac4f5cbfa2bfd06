use url::Url;

/// One page to fetch: a canonical URL at a discovery depth
///
/// URL and depth are fixed at creation. The retry counter is only touched by
/// the worker currently holding the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    url: Url,
    depth: u32,
    tries: u32,
}

impl Job {
    /// Creates a depth-0 job (seeds and reset cross-host links)
    pub fn seed(url: Url) -> Self {
        Self::at_depth(url, 0)
    }

    /// Creates a job at the given depth
    pub fn at_depth(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            tries: 0,
        }
    }

    /// The canonical URL to fetch
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Same-host discovery depth
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of transient failures so far
    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Records a transient failure and returns the new try count
    pub fn record_failure(&mut self) -> u32 {
        self.tries += 1;
        self.tries
    }
}
