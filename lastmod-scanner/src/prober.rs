use crate::client::{PURPOSE_HEADER, Purpose};
use crate::error::Result;
use crate::record::{EnrichedRecord, HeaderSource, HtmlSource, ProbeOutcome, UrlRecord};
use reqwest::Client;
use reqwest::header::{DATE, HeaderMap, HeaderName, LAST_MODIFIED};
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Looks up a page's modification time: once from the HEAD response
/// headers and once from the page's HTML.
///
/// Failures are never returned from [`PageProber::probe`]; a failed lookup
/// is logged and leaves its column empty.
pub struct PageProber {
    client: Client,
    timeout: Duration,
}

impl PageProber {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn probe(&self, record: &UrlRecord) -> EnrichedRecord {
        let outcome = self.probe_url(&record.url).await;
        EnrichedRecord::from_probe(record, &outcome)
    }

    pub async fn probe_url(&self, url: &str) -> ProbeOutcome {
        let header_last_modified = match self.header_last_modified(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Error fetching headers for {}: {}", url, e);
                None
            }
        };

        let html_last_modified = match self.html_last_modified(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Error fetching HTML for {}: {}", url, e);
                None
            }
        };

        ProbeOutcome {
            header_last_modified,
            html_last_modified,
        }
    }

    /// HEAD the page (redirects followed) and read `Last-Modified`,
    /// falling back to `Date`.
    pub async fn header_last_modified(&self, url: &str) -> Result<Option<(String, HeaderSource)>> {
        let response = self
            .client
            .head(url)
            .timeout(self.timeout)
            .header(PURPOSE_HEADER, Purpose::LastModCheck.as_str())
            .send()
            .await?;

        debug!("HEAD {} -> {}", response.url(), response.status());
        let found = last_modified_from_headers(response.headers());
        if let Some((ref value, source)) = found {
            debug!("  {:?} header: {}", source, value);
        }

        Ok(found)
    }

    /// GET the page and search its markup. The status code is not checked:
    /// error pages are parsed like any other body.
    pub async fn html_last_modified(&self, url: &str) -> Result<Option<(String, HtmlSource)>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(PURPOSE_HEADER, Purpose::LastModHtml.as_str())
            .send()
            .await?;

        debug!("GET {} -> {}", response.url(), response.status());
        let body = response.text().await?;
        let found = extract_html_last_modified(&body);
        if let Some((ref value, source)) = found {
            debug!("  {:?} markup: {}", source, value);
        }

        Ok(found)
    }
}

/// `Last-Modified` if present and non-empty, otherwise `Date`.
pub fn last_modified_from_headers(headers: &HeaderMap) -> Option<(String, HeaderSource)> {
    header_text(headers, LAST_MODIFIED)
        .map(|v| (v, HeaderSource::LastModified))
        .or_else(|| header_text(headers, DATE).map(|v| (v, HeaderSource::Date)))
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Search page markup for a modification date. In order:
/// `<meta name="last-modified">`, schema.org `itemprop="dateModified"`
/// microdata, then `dateModified` in JSON-LD blocks.
pub fn extract_html_last_modified(html: &str) -> Option<(String, HtmlSource)> {
    let document = Html::parse_document(html);

    meta_last_modified(&document)
        .map(|v| (v, HtmlSource::MetaTag))
        .or_else(|| microdata_date_modified(&document).map(|v| (v, HtmlSource::Microdata)))
        .or_else(|| jsonld_date_modified(&document).map(|v| (v, HtmlSource::JsonLd)))
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn meta_last_modified(document: &Html) -> Option<String> {
    let meta = selector("meta[name]")?;
    document
        .select(&meta)
        .filter(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("last-modified"))
        })
        .find_map(|el| el.value().attr("content").and_then(non_empty))
}

fn microdata_date_modified(document: &Html) -> Option<String> {
    let itemprop = selector(r#"[itemprop~="dateModified"]"#)?;
    document.select(&itemprop).find_map(|el| {
        let value = el.value();
        value
            .attr("content")
            .and_then(non_empty)
            .or_else(|| value.attr("datetime").and_then(non_empty))
    })
}

fn jsonld_date_modified(document: &Html) -> Option<String> {
    let scripts = selector(r#"script[type="application/ld+json"]"#)?;
    document.select(&scripts).find_map(|el| {
        let raw: String = el.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(json) => find_date_modified(&json),
            Err(e) => {
                debug!("Skipping unparsable JSON-LD block: {}", e);
                None
            }
        }
    })
}

/// Depth-first search for the first string `dateModified`, checking an
/// object's own key before its children (`@graph` and friends).
fn find_date_modified(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("dateModified")
            .and_then(|v| v.as_str())
            .and_then(non_empty)
            .or_else(|| map.values().find_map(find_date_modified)),
        Value::Array(items) => items.iter().find_map(find_date_modified),
        _ => None,
    }
}
