use crate::config::ScrapeConfig;
use crate::export::save_to_csv;
use indicatif::{ProgressBar, ProgressStyle};
use lastmod_scanner::{
    EnrichedRecord, PageProber, Result, ScrapeError, SitemapFetcher, SitemapParser, UrlRecord,
    build_client,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Callback for reporting run progress, one line per call
pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    /// Records that survived the exclusion filter, before the cap.
    pub discovered: usize,
    pub records: Vec<EnrichedRecord>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn probed(&self) -> usize {
        self.records.len()
    }

    pub fn with_header_date(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.http_last_modified.is_empty())
            .count()
    }

    pub fn with_html_date(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.http_last_modified2.is_empty())
            .count()
    }
}

/// Runs fetch → parse → probe → export, one request at a time.
pub struct Scraper {
    config: ScrapeConfig,
    fetcher: SitemapFetcher,
    parser: SitemapParser,
    prober: PageProber,
    progress_callback: Option<ProgressCallback>,
    show_progress_bar: bool,
}

impl Scraper {
    /// Validate `config` and build the HTTP client shared by every request
    /// of the run.
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let filter = config.validate()?;
        let client = build_client(&config.user_agent)?;

        Ok(Self {
            fetcher: SitemapFetcher::new(client.clone(), config.sitemap_timeout),
            parser: SitemapParser::new(filter),
            prober: PageProber::new(client, config.probe_timeout),
            config,
            progress_callback: None,
            show_progress_bar: false,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    fn report(&self, progress_bar: Option<&ProgressBar>, msg: String) {
        if let Some(ref callback) = self.progress_callback {
            match progress_bar {
                Some(pb) => pb.suspend(|| callback(msg)),
                None => callback(msg),
            }
        }
    }

    /// Fetch and parse the sitemap. Fails with `NotFound` when nothing
    /// survives the exclusion filter.
    pub async fn collect_urls(&self) -> Result<Vec<UrlRecord>> {
        self.report(None, "Fetching sitemap...".to_string());
        let xml = self.fetcher.fetch(&self.config.sitemap_url).await?;

        self.report(None, "Parsing sitemap...".to_string());
        let records = self.parser.parse(&xml)?;
        self.report(None, format!("Found {} URLs matching pattern", records.len()));

        if records.is_empty() {
            return Err(ScrapeError::NotFound(format!(
                "no URLs left in {} after excluding '{}'",
                self.config.sitemap_url,
                self.parser.filter().as_str()
            )));
        }

        Ok(records)
    }

    /// Probe up to `max_urls` records in order, pausing `fetch_delay`
    /// between consecutive probes. Always returns one enriched record per
    /// probed input.
    pub async fn probe_all(&self, records: &[UrlRecord]) -> Vec<EnrichedRecord> {
        let count = self.config.probe_count(records.len());
        let selected = &records[..count];

        let progress_bar = self.show_progress_bar.then(|| {
            let pb = ProgressBar::new(count as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        });

        self.report(progress_bar.as_ref(), format!("Processing {} URLs...", count));

        let mut results = Vec::with_capacity(count);
        for (idx, record) in selected.iter().enumerate() {
            if idx > 0 && !self.config.fetch_delay.is_zero() {
                tokio::time::sleep(self.config.fetch_delay).await;
            }

            self.report(
                progress_bar.as_ref(),
                format!("Processing {}/{}: {}", idx + 1, count, record.url),
            );
            if let Some(ref pb) = progress_bar {
                pb.set_message(record.url.clone());
            }

            results.push(self.prober.probe(record).await);

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(ref pb) = progress_bar {
            pb.finish_and_clear();
        }

        results
    }

    /// The whole job. Nothing is written unless every fatal step succeeds.
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        info!("Starting sitemap audit of {}", self.config.sitemap_url);

        let urls = self.collect_urls().await?;
        let records = self.probe_all(&urls).await;
        let output = save_to_csv(&records, self.config.output.as_deref(), &self.config.file_prefix)?;

        let summary = RunSummary {
            output,
            discovered: urls.len(),
            records,
            elapsed: start.elapsed(),
        };
        info!(
            "Audit finished: {} pages probed in {:.2}s",
            summary.probed(),
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }
}
