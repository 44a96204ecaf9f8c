// CSV export of enriched sitemap records

use chrono::Utc;
use lastmod_scanner::{EnrichedRecord, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column order of every file we write. Matches the field order of
/// [`EnrichedRecord`].
pub const CSV_HEADERS: [&str; 6] = [
    "url",
    "changefreq",
    "priority",
    "sitemap_lastmod",
    "http_last_modified",
    "http_last_modified2",
];

/// `<temp dir>/<prefix>-<unix seconds>.csv`
pub fn default_output_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.csv", prefix, Utc::now().timestamp()))
}

/// Write the header row and one row per record to `path`, replacing any
/// existing file. The header is written even when `records` is empty.
pub fn write_csv(records: &[EnrichedRecord], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write `records` to `output`, or to a generated path when `None`.
/// Returns the path actually written.
pub fn save_to_csv(
    records: &[EnrichedRecord],
    output: Option<&Path>,
    file_prefix: &str,
) -> Result<PathBuf> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(file_prefix));

    write_csv(records, &path)?;
    info!("Data saved to {}", path.display());

    Ok(path)
}
