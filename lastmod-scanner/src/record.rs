use serde::{Deserialize, Serialize};

/// One `<url>` entry of a sitemap that survived the exclusion filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: String,
    pub changefreq: String,
    pub priority: String,
    pub lastmod: String,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            changefreq: String::new(),
            priority: String::new(),
            lastmod: String::new(),
        }
    }
}

/// A [`UrlRecord`] plus whatever the page probe found. Field order is the
/// CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub url: String,
    pub changefreq: String,
    pub priority: String,
    pub sitemap_lastmod: String,
    pub http_last_modified: String,
    pub http_last_modified2: String,
}

impl EnrichedRecord {
    pub fn from_probe(record: &UrlRecord, outcome: &ProbeOutcome) -> Self {
        Self {
            url: record.url.clone(),
            changefreq: record.changefreq.clone(),
            priority: record.priority.clone(),
            sitemap_lastmod: record.lastmod.clone(),
            http_last_modified: outcome.header_value().to_string(),
            http_last_modified2: outcome.html_value().to_string(),
        }
    }
}

/// Which response header supplied the header timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    LastModified,
    Date,
}

/// Which piece of page markup supplied the HTML timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlSource {
    /// `<meta name="last-modified" content="...">`
    MetaTag,
    /// schema.org microdata, `itemprop="dateModified"`
    Microdata,
    /// `dateModified` inside a JSON-LD script block
    JsonLd,
}

/// Raw result of probing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub header_last_modified: Option<(String, HeaderSource)>,
    pub html_last_modified: Option<(String, HtmlSource)>,
}

impl ProbeOutcome {
    pub fn header_value(&self) -> &str {
        self.header_last_modified
            .as_ref()
            .map(|(value, _)| value.as_str())
            .unwrap_or("")
    }

    pub fn html_value(&self) -> &str {
        self.html_last_modified
            .as_ref()
            .map(|(value, _)| value.as_str())
            .unwrap_or("")
    }
}
