use lastmod_scanner::{DEFAULT_USER_AGENT, Result, ScrapeError, UrlFilter};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SITEMAP_URL: &str = "https://support.touchgfx.com/sitemap.xml";
/// The 4.1/4.2 documentation subtree is archived and left out of the audit.
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"https://support\.touchgfx\.com/4\.[12].*";
pub const DEFAULT_MAX_URLS: usize = 10;
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(750);
pub const DEFAULT_SITEMAP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FILE_PREFIX: &str = "lastmod";

/// Everything a run needs to know. Defaults reproduce the TouchGFX audit.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub sitemap_url: String,
    pub exclude_pattern: String,
    /// Maximum number of pages probed per run. Zero means no cap.
    pub max_urls: usize,
    /// Pause between two consecutive page probes.
    pub fetch_delay: Duration,
    pub sitemap_timeout: Duration,
    pub probe_timeout: Duration,
    pub user_agent: String,
    /// Output file. `None` writes a timestamped file to the temp directory.
    pub output: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            sitemap_url: DEFAULT_SITEMAP_URL.to_string(),
            exclude_pattern: DEFAULT_EXCLUDE_PATTERN.to_string(),
            max_urls: DEFAULT_MAX_URLS,
            fetch_delay: DEFAULT_FETCH_DELAY,
            sitemap_timeout: DEFAULT_SITEMAP_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sitemap_url(mut self, url: impl Into<String>) -> Self {
        self.sitemap_url = url.into();
        self
    }

    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_pattern = pattern.into();
        self
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_sitemap_timeout(mut self, timeout: Duration) -> Self {
        self.sitemap_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Check the sitemap URL and compile the exclusion pattern.
    pub fn validate(&self) -> Result<UrlFilter> {
        let url = Url::parse(&self.sitemap_url)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", self.sitemap_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ScrapeError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                self.sitemap_url,
                url.scheme()
            )));
        }

        UrlFilter::new(&self.exclude_pattern)
    }

    /// How many of `available` records a run will probe.
    pub fn probe_count(&self, available: usize) -> usize {
        if self.max_urls == 0 {
            available
        } else {
            available.min(self.max_urls)
        }
    }
}
