pub mod client;
pub mod error;
pub mod fetcher;
pub mod prober;
pub mod record;
pub mod sitemap;

pub use client::{DEFAULT_USER_AGENT, Purpose, build_client};
pub use error::{Result, ScrapeError};
pub use fetcher::SitemapFetcher;
pub use prober::PageProber;
pub use record::{EnrichedRecord, HeaderSource, HtmlSource, ProbeOutcome, UrlRecord};
pub use sitemap::{SitemapParser, UrlFilter, parse_sitemap};
