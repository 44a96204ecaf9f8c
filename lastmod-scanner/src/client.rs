use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Browser-like user agent; some documentation hosts refuse unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Header attached to every request so the remote side can tell our
/// traffic apart in its logs.
pub const PURPOSE_HEADER: &str = "X-Purpose";

const MAX_REDIRECTS: usize = 10;

/// Why a request is being sent. Sent as the [`PURPOSE_HEADER`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    SitemapFetch,
    LastModCheck,
    LastModHtml,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::SitemapFetch => "sitemap-fetch",
            Purpose::LastModCheck => "last-mod-check",
            Purpose::LastModHtml => "last-mod-html",
        }
    }
}

/// Build the shared HTTP client for a run. Timeouts are applied per request
/// by the fetcher and prober, so only connection-level settings live here.
pub fn build_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;

    Ok(client)
}
