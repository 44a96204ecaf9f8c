// Plain-text run reports

use crate::pipeline::RunSummary;
use colored::Colorize;
use lastmod_scanner::UrlRecord;
use std::time::Duration;

/// Seconds with two decimals, e.g. `"3.14 seconds"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}

pub fn generate_run_report(summary: &RunSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  URLs in sitemap (after exclusions): {}\n", summary.discovered));
    report.push_str(&format!("  Pages probed: {}\n", summary.probed()));
    report.push_str(&format!(
        "  With header timestamp: {}\n",
        summary.with_header_date()
    ));
    report.push_str(&format!("  With HTML timestamp: {}\n", summary.with_html_date()));

    let missing_lastmod = summary
        .records
        .iter()
        .filter(|r| r.sitemap_lastmod.is_empty())
        .count();
    if missing_lastmod > 0 {
        report.push_str(&format!("  Missing sitemap lastmod: {}\n", missing_lastmod));
    }

    report.push_str(&format!("\n  Output file: {}\n", summary.output.display()));
    report.push_str(&format!("  Elapsed time: {}\n", format_elapsed(summary.elapsed)));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    report
}

/// Listing used by the `parse` dry run: one URL per line with its sitemap
/// metadata.
pub fn generate_url_listing(records: &[UrlRecord]) -> String {
    let mut listing = String::new();
    listing.push_str(&format!("{} URLs\n\n", records.len()));

    for record in records {
        listing.push_str(&format!("  {}", record.url));

        let meta: Vec<String> = [
            ("lastmod", &record.lastmod),
            ("changefreq", &record.changefreq),
            ("priority", &record.priority),
        ]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();

        if !meta.is_empty() {
            listing.push_str(&format!(" {}", meta.join(" ").bright_black()));
        }
        listing.push('\n');
    }

    listing
}
