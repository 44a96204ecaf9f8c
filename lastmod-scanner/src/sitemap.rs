//! Parse sitemap-protocol `urlset` documents into [`UrlRecord`]s.

use crate::error::{Result, ScrapeError};
use crate::record::UrlRecord;
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use regex::Regex;
use tracing::{debug, warn};

pub const SITEMAP_NAMESPACE: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Excludes sitemap entries whose `loc` matches a regular expression.
///
/// The pattern is anchored at the start of the URL, so `https://a\.com/4\.`
/// excludes everything under that prefix but not a URL that merely
/// contains it further along.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    pattern: Option<Regex>,
    source: String,
}

impl UrlFilter {
    /// An empty pattern excludes nothing.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::none());
        }

        let anchored = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self {
            pattern: Some(anchored),
            source: pattern.to_string(),
        })
    }

    pub fn none() -> Self {
        Self {
            pattern: None,
            source: String::new(),
        }
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|re| re.is_match(url))
            .unwrap_or(false)
    }

    /// The pattern as given by the caller, without the added anchor.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    ChangeFreq,
    Priority,
    LastMod,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Field::Loc),
            b"changefreq" => Some(Field::ChangeFreq),
            b"priority" => Some(Field::Priority),
            b"lastmod" => Some(Field::LastMod),
            _ => None,
        }
    }
}

/// Fields of the `<url>` element currently being read. `None` means the
/// child element has not been seen yet; only the first occurrence counts.
#[derive(Debug, Default)]
struct PendingEntry {
    loc: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
    lastmod: Option<String>,
}

impl PendingEntry {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Loc => &mut self.loc,
            Field::ChangeFreq => &mut self.changefreq,
            Field::Priority => &mut self.priority,
            Field::LastMod => &mut self.lastmod,
        }
    }

    /// Claim `field` for reading. Returns false if it was already read.
    fn open(&mut self, field: Field) -> bool {
        let slot = self.slot(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(String::new());
        true
    }

    fn push_text(&mut self, field: Field, text: &str) {
        if let Some(value) = self.slot(field) {
            value.push_str(text);
        }
    }

    fn into_record(self) -> Option<UrlRecord> {
        let loc = self.loc.map(|s| s.trim().to_string()).unwrap_or_default();
        if loc.is_empty() {
            return None;
        }

        let clean = |value: Option<String>| value.map(|s| s.trim().to_string()).unwrap_or_default();
        Some(UrlRecord {
            url: loc,
            changefreq: clean(self.changefreq),
            priority: clean(self.priority),
            lastmod: clean(self.lastmod),
        })
    }
}

/// Turns sitemap XML into URL records, applying the exclusion filter.
#[derive(Debug, Clone, Default)]
pub struct SitemapParser {
    filter: UrlFilter,
}

impl SitemapParser {
    pub fn new(filter: UrlFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Parse a `urlset` document.
    ///
    /// Only `<url>` elements directly under the root, and only their direct
    /// `loc`/`changefreq`/`priority`/`lastmod` children, are read, and all
    /// of them must be in the sitemap namespace. Entries without a `loc`
    /// are skipped. Records come back in document order.
    pub fn parse(&self, xml: &str) -> Result<Vec<UrlRecord>> {
        let mut reader = NsReader::from_str(xml);

        let mut depth = 0usize;
        let mut seen_root = false;
        let mut entry: Option<PendingEntry> = None;
        let mut field: Option<Field> = None;

        let mut records = Vec::new();
        let mut excluded = 0usize;
        let mut missing_loc = 0usize;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| ScrapeError::Parse(e.to_string()))?;
            let in_sitemap_ns = match resolved {
                ResolveResult::Bound(Namespace(ns)) => ns == SITEMAP_NAMESPACE,
                _ => false,
            };

            match event {
                Event::Start(e) => {
                    let local = e.local_name();
                    let name = local.as_ref();

                    if depth == 0 {
                        if seen_root {
                            return Err(ScrapeError::Parse(
                                "junk after document element".to_string(),
                            ));
                        }
                        seen_root = true;
                        if name == b"sitemapindex" {
                            warn!("Document is a sitemap index; nested sitemaps are not followed");
                        }
                    } else if depth == 1 && in_sitemap_ns && name == b"url" {
                        entry = Some(PendingEntry::default());
                    } else if depth == 2 && in_sitemap_ns {
                        if let Some(current) = entry.as_mut() {
                            field = Field::from_local_name(name).filter(|f| current.open(*f));
                        }
                    }

                    depth += 1;
                }
                Event::Empty(e) => {
                    let local = e.local_name();
                    let name = local.as_ref();

                    if depth == 0 {
                        if seen_root {
                            return Err(ScrapeError::Parse(
                                "junk after document element".to_string(),
                            ));
                        }
                        seen_root = true;
                    } else if depth == 1 && in_sitemap_ns && name == b"url" {
                        missing_loc += 1;
                    } else if depth == 2 && in_sitemap_ns {
                        if let (Some(current), Some(f)) =
                            (entry.as_mut(), Field::from_local_name(name))
                        {
                            current.open(f);
                        }
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Err(ScrapeError::Parse("unexpected closing tag".to_string()));
                    }
                    depth -= 1;

                    if depth == 2 {
                        field = None;
                    } else if depth == 1 {
                        if let Some(finished) = entry.take() {
                            match finished.into_record() {
                                Some(record) if self.filter.is_excluded(&record.url) => {
                                    excluded += 1;
                                }
                                Some(record) => records.push(record),
                                None => missing_loc += 1,
                            }
                        }
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| ScrapeError::Parse(e.to_string()))?;
                    if depth == 0 && !text.trim().is_empty() {
                        return Err(ScrapeError::Parse(
                            "text outside of the document element".to_string(),
                        ));
                    }
                    if depth == 3 {
                        if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                            current.push_text(f, &text);
                        }
                    }
                }
                Event::CData(e) => {
                    if depth == 3 {
                        if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                            current.push_text(f, &String::from_utf8_lossy(&e));
                        }
                    }
                }
                Event::Eof => {
                    if depth > 0 {
                        return Err(ScrapeError::Parse(format!(
                            "unexpected end of document with {} unclosed element(s)",
                            depth
                        )));
                    }
                    if !seen_root {
                        return Err(ScrapeError::Parse("no document element found".to_string()));
                    }
                    break;
                }
                _ => {}
            }
        }

        debug!(
            "Parsed sitemap: {} kept, {} excluded, {} without loc",
            records.len(),
            excluded,
            missing_loc
        );

        Ok(records)
    }
}

/// Parse with a filter built from `pattern`.
pub fn parse_sitemap(xml: &str, pattern: &str) -> Result<Vec<UrlRecord>> {
    SitemapParser::new(UrlFilter::new(pattern)?).parse(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOUCHGFX_PATTERN: &str = r"https://support\.touchgfx\.com/4\.[12].*";

    fn urlset(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            body
        )
    }

    #[test]
    fn test_parse_excludes_matching_entries() {
        let xml = urlset(
            r#"
            <url>
              <loc>https://support.touchgfx.com/docs/introduction</loc>
              <changefreq>weekly</changefreq>
              <priority>0.5</priority>
              <lastmod>2024-01-15</lastmod>
            </url>
            <url>
              <loc>https://support.touchgfx.com/4.1/docs/introduction</loc>
              <changefreq>weekly</changefreq>
            </url>
            <url>
              <loc>https://support.touchgfx.com/docs/api</loc>
            </url>"#,
        );

        let records = parse_sitemap(&xml, TOUCHGFX_PATTERN).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://support.touchgfx.com/docs/introduction");
        assert_eq!(records[0].changefreq, "weekly");
        assert_eq!(records[0].priority, "0.5");
        assert_eq!(records[0].lastmod, "2024-01-15");
        assert_eq!(records[1].url, "https://support.touchgfx.com/docs/api");
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let xml = urlset("<url><loc>https://example.com/</loc></url>");

        let records = parse_sitemap(&xml, "").unwrap();
        assert_eq!(records, vec![UrlRecord::new("https://example.com/")]);
    }

    #[test]
    fn test_entries_without_loc_are_skipped() {
        let xml = urlset(
            r#"
            <url><lastmod>2024-01-01</lastmod></url>
            <url><loc></loc></url>
            <url><loc>   </loc></url>
            <url/>
            <url><loc>https://example.com/kept</loc></url>"#,
        );

        let records = parse_sitemap(&xml, "").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/kept");
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let xml = urlset(
            r#"
            <url><loc>https://support.touchgfx.com/4.2/x</loc></url>
            <url><loc>https://mirror.example.com/?u=https://support.touchgfx.com/4.2/x</loc></url>
            <url><loc>https://support.touchgfx.com/4.20-beta</loc></url>
            <url><loc>https://support.touchgfx.com/4.3/x</loc></url>"#,
        );

        let records = parse_sitemap(&xml, TOUCHGFX_PATTERN).unwrap();
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://mirror.example.com/?u=https://support.touchgfx.com/4.2/x",
                "https://support.touchgfx.com/4.3/x",
            ]
        );
    }

    #[test]
    fn test_preserves_document_order() {
        let body: String = (0..20)
            .map(|i| format!("<url><loc>https://example.com/p{}</loc></url>", i))
            .collect();

        let records = parse_sitemap(&urlset(&body), "").unwrap();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.url, format!("https://example.com/p{}", i));
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let xml = urlset(
            r#"
            <url><loc>https://example.com/a</loc><priority>1.0</priority></url>
            <url><loc>https://example.com/b</loc><lastmod>2023-05-01</lastmod></url>"#,
        );
        let parser = SitemapParser::new(UrlFilter::new(r"https://example\.com/b").unwrap());

        assert_eq!(parser.parse(&xml).unwrap(), parser.parse(&xml).unwrap());
    }

    #[test]
    fn test_ignores_elements_outside_sitemap_namespace() {
        let xml = r#"<?xml version="1.0"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
                xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
          <url>
            <loc>https://example.com/</loc>
            <image:image><image:loc>https://example.com/logo.png</image:loc></image:image>
          </url>
          <image:url><image:loc>https://example.com/not-a-page</image:loc></image:url>
        </urlset>"#;

        let records = parse_sitemap(xml, "").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/");
    }

    #[test]
    fn test_unnamespaced_document_has_no_records() {
        let xml = "<urlset><url><loc>https://example.com/</loc></url></urlset>";
        assert!(parse_sitemap(xml, "").unwrap().is_empty());
    }

    #[test]
    fn test_first_occurrence_of_field_wins() {
        let xml = urlset(
            r#"<url>
                 <loc>https://example.com/</loc>
                 <lastmod>2024-01-01</lastmod>
                 <lastmod>1999-01-01</lastmod>
               </url>"#,
        );

        let records = parse_sitemap(&xml, "").unwrap();
        assert_eq!(records[0].lastmod, "2024-01-01");
    }

    #[test]
    fn test_entities_and_cdata_are_decoded() {
        let xml = urlset(
            r#"<url><loc>https://example.com/?a=1&amp;b=2</loc></url>
               <url><loc><![CDATA[https://example.com/cdata]]></loc></url>"#,
        );

        let records = parse_sitemap(&xml, "").unwrap();
        assert_eq!(records[0].url, "https://example.com/?a=1&b=2");
        assert_eq!(records[1].url, "https://example.com/cdata");
    }

    #[test]
    fn test_sitemap_index_yields_no_records() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sitemap><loc>https://example.com/sitemap-1.xml</loc></sitemap>
        </sitemapindex>"#;

        assert!(parse_sitemap(xml, "").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let inputs = [
            "",
            "not xml at all",
            "<urlset><url></urlset>",
            "<urlset><url><loc>https://example.com/</loc></url>",
            "<urlset></urlset><urlset></urlset>",
            "<urlset></urlset></url>",
        ];

        for input in inputs {
            let result = parse_sitemap(input, "");
            assert!(
                matches!(result, Err(ScrapeError::Parse(_))),
                "expected parse error for {:?}, got {:?}",
                input,
                result
            );
        }
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = UrlFilter::new("https://example.com/(");
        assert!(matches!(result, Err(ScrapeError::InvalidPattern(_))));
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = UrlFilter::none();
        assert!(!filter.is_excluded("https://support.touchgfx.com/4.1/"));
        assert_eq!(filter.as_str(), "");
    }
}
