use serde::Deserialize;

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// How links that leave the source page's host are admitted to the frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalLinkPolicy {
    /// Enqueue cross-host links at depth 0, as fresh seeds
    #[default]
    Reset,
    /// Treat cross-host links like internal ones: `depth + 1`, bounded by max depth
    Increment,
    /// Emit cross-host edges but never enqueue them
    Ignore,
}

impl std::str::FromStr for ExternalLinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "increment" => Ok(Self::Increment),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!(
                "unknown external link policy '{}' (expected reset, increment or ignore)",
                other
            )),
        }
    }
}

/// Crawl engine configuration
///
/// Fixed at engine construction; never changes while the engine runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of successfully processed pages at which the crawl stops
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Fetch attempts per job before a transiently failing job is dropped
    #[serde(rename = "max-tries")]
    pub max_tries: u32,

    /// Maximum same-host depth
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent workers
    pub workers: usize,

    /// Expected number of distinct URLs for sizing the visited filter
    /// (defaults to `max_pages`)
    #[serde(rename = "filter-capacity")]
    pub filter_capacity: Option<usize>,

    /// Target false-positive rate of the visited filter
    #[serde(rename = "false-positive-rate")]
    pub false_positive_rate: f64,

    /// Admission rule for cross-host links
    #[serde(rename = "external-links")]
    pub external_links: ExternalLinkPolicy,

    /// Close the frontier once no job is queued or in flight
    #[serde(rename = "stop-when-idle")]
    pub stop_when_idle: bool,
}

impl CrawlerConfig {
    /// Capacity hint for the visited filter
    pub fn filter_capacity(&self) -> usize {
        self.filter_capacity.unwrap_or(self.max_pages)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            max_tries: 5,
            max_depth: 3,
            workers: default_workers(),
            filter_capacity: None,
            false_positive_rate: 0.01,
            external_links: ExternalLinkPolicy::Reset,
            stop_when_idle: true,
        }
    }
}

/// Two workers per available hardware thread
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// HTTP link fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("ripple-crawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Edge list destination; `-` writes to stdout
    pub path: String,

    /// Seconds between progress reports
    #[serde(rename = "progress-interval-secs")]
    pub progress_interval_secs: u64,
}

impl OutputConfig {
    /// Returns true if edges go to stdout
    pub fn is_stdout(&self) -> bool {
        self.path.trim() == "-"
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "-".to_string(),
            progress_interval_secs: 10,
        }
    }
}
