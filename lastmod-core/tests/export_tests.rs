// Tests for CSV export

use lastmod_core::export::{CSV_HEADERS, default_output_path, save_to_csv, write_csv};
use lastmod_scanner::{EnrichedRecord, ScrapeError};
use std::fs;
use tempfile::tempdir;

fn record(url: &str, sitemap_lastmod: &str, header: &str, html: &str) -> EnrichedRecord {
    EnrichedRecord {
        url: url.to_string(),
        changefreq: "weekly".to_string(),
        priority: "0.5".to_string(),
        sitemap_lastmod: sitemap_lastmod.to_string(),
        http_last_modified: header.to_string(),
        http_last_modified2: html.to_string(),
    }
}

// ============================================================================
// File layout
// ============================================================================

#[test]
fn test_write_csv_header_and_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");

    let records = vec![
        record("https://example.com/a", "2024-01-01", "", "2024-05-01"),
        record("https://example.com/b", "", "Tue, 01 Jan 2030 00:00:00 GMT", ""),
    ];
    write_csv(&records, &path)?;

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(
        lines[0],
        "url,changefreq,priority,sitemap_lastmod,http_last_modified,http_last_modified2"
    );
    assert_eq!(lines[1], "https://example.com/a,weekly,0.5,2024-01-01,,2024-05-01");
    assert_eq!(
        lines[2],
        "https://example.com/b,weekly,0.5,,\"Tue, 01 Jan 2030 00:00:00 GMT\","
    );
    assert_eq!(lines.len(), 3);

    Ok(())
}

#[test]
fn test_write_csv_empty_still_has_header() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("empty.csv");

    write_csv(&[], &path)?;

    let content = fs::read_to_string(&path)?;
    assert_eq!(content.trim_end(), CSV_HEADERS.join(","));

    Ok(())
}

#[test]
fn test_write_csv_quotes_special_characters() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("quoted.csv");

    let records = vec![record("https://example.com/?q=\"a\",b", "", "", "")];
    write_csv(&records, &path)?;

    let mut reader = csv::Reader::from_path(&path)?;
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "https://example.com/?q=\"a\",b");

    Ok(())
}

#[test]
fn test_write_csv_overwrites_existing_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");
    fs::write(&path, "old content\nthat is longer than the new one\n".repeat(50))?;

    write_csv(&[], &path)?;

    let content = fs::read_to_string(&path)?;
    assert!(!content.contains("old content"));

    Ok(())
}

#[test]
fn test_write_csv_unwritable_path_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("out.csv");

    let result = write_csv(&[], &path);
    assert!(matches!(result, Err(ScrapeError::Io(_))));
    assert!(!path.exists());
}

// ============================================================================
// Output path selection
// ============================================================================

#[test]
fn test_default_output_path_is_timestamped_in_temp_dir() {
    let path = default_output_path("lastmod");

    assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("lastmod-"));
    assert!(name.ends_with(".csv"));

    let stamp = name.trim_start_matches("lastmod-").trim_end_matches(".csv");
    assert!(stamp.parse::<i64>().is_ok(), "not an epoch timestamp: {}", stamp);
}

#[test]
fn test_save_to_csv_uses_given_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("chosen.csv");

    let written = save_to_csv(&[], Some(&path), "ignored")?;

    assert_eq!(written, path);
    assert!(path.exists());

    Ok(())
}

#[test]
fn test_save_to_csv_generates_path() -> Result<(), Box<dyn std::error::Error>> {
    let written = save_to_csv(&[], None, "lastmod-export-test")?;

    assert!(written.exists());
    assert!(
        written
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("lastmod-export-test-")
    );
    fs::remove_file(&written)?;

    Ok(())
}
