use colored::Colorize;

pub mod config;
pub mod export;
pub mod pipeline;
pub mod report;

pub use config::ScrapeConfig;
pub use pipeline::{ProgressCallback, RunSummary, Scraper};

pub fn print_banner() {
    let banner = r#"
  _           _                       _
 | | __ _ ___| |_ _ __ ___   ___   __| |
 | |/ _` / __| __| '_ ` _ \ / _ \ / _` |
 | | (_| \__ \ |_| | | | | | (_) | (_| |
 |_|\__,_|___/\__|_| |_| |_|\___/ \__,_|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "sitemap last-modified auditor".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
