use clap::ArgMatches;
use colored::Colorize;
use lastmod_core::report::{format_elapsed, generate_run_report, generate_url_listing};
use lastmod_core::{ProgressCallback, ScrapeConfig, Scraper};
use lastmod_scanner::ScrapeError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;
use url::Url;

/// Install the fmt subscriber. `verbose` lowers the threshold to DEBUG.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Expand a leading `~` in a user-supplied output path.
pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Settings shared by every subcommand: the sitemap and the exclusion
/// pattern.
pub fn base_config(args: &ArgMatches) -> ScrapeConfig {
    let mut config = ScrapeConfig::new();

    if let Some(url) = args.get_one::<Url>("url") {
        config = config.with_sitemap_url(url.as_str());
    }
    if let Some(pattern) = args.get_one::<String>("exclude") {
        config = config.with_exclude_pattern(pattern.as_str());
    }

    config
}

/// Full run configuration from the `scrape` subcommand's arguments.
pub fn scrape_config(args: &ArgMatches) -> ScrapeConfig {
    let mut config = base_config(args);

    if let Some(max_urls) = args.get_one::<usize>("max-urls") {
        config = config.with_max_urls(*max_urls);
    }
    if let Some(delay) = args.get_one::<u64>("delay-ms") {
        config = config.with_fetch_delay(Duration::from_millis(*delay));
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_probe_timeout(Duration::from_secs(*timeout));
    }
    if let Some(timeout) = args.get_one::<u64>("sitemap-timeout") {
        config = config.with_sitemap_timeout(Duration::from_secs(*timeout));
    }
    if let Some(user_agent) = args.get_one::<String>("user-agent") {
        config = config.with_user_agent(user_agent.as_str());
    }
    if let Some(prefix) = args.get_one::<String>("prefix") {
        config = config.with_file_prefix(prefix.as_str());
    }

    config.with_output(
        args.get_one::<String>("output")
            .map(|raw| expand_output_path(raw)),
    )
}

fn print_source(config: &ScrapeConfig) {
    println!("{} Sitemap: {}", "→".blue(), config.sitemap_url.bright_white());
    if config.exclude_pattern.is_empty() {
        println!("{} Exclude: {}", "→".blue(), "(nothing)".bright_black());
    } else {
        println!("{} Exclude: {}", "→".blue(), config.exclude_pattern.bright_white());
    }
}

fn print_limits(config: &ScrapeConfig) {
    let cap = if config.max_urls == 0 {
        "unlimited".to_string()
    } else {
        config.max_urls.to_string()
    };
    println!("{} Max URLs: {}", "→".blue(), cap.cyan());
    println!(
        "{} Delay: {} ms",
        "→".blue(),
        config.fetch_delay.as_millis().to_string().cyan()
    );
}

/// Print a failed run the way the operator expects: an empty result is a
/// notice, anything else an error. Both include the elapsed time.
fn report_failure(error: &ScrapeError, elapsed: Duration) {
    if error.is_not_found() {
        println!("{} {}", "!".yellow().bold(), error);
    } else {
        println!("{} Error during scraping: {}", "✗".red().bold(), error);
    }
    println!("{} Elapsed time: {}", "→".blue(), format_elapsed(elapsed));
}

pub async fn handle_scrape(sub_matches: &ArgMatches) {
    let start = Instant::now();
    let config = scrape_config(sub_matches);
    let show_progress_bar = !sub_matches.get_flag("no-progress");

    println!("\n{} Starting sitemap scraper", "🗺".bright_cyan());
    print_source(&config);
    print_limits(&config);
    println!();

    let progress_callback: ProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let scraper = match Scraper::new(config) {
        Ok(scraper) => scraper
            .with_progress_callback(progress_callback)
            .with_progress_bar(show_progress_bar),
        Err(e) => {
            report_failure(&e, start.elapsed());
            return;
        }
    };

    match scraper.run().await {
        Ok(summary) => {
            println!("\n{} Scraping complete!\n", "✓".green().bold());
            print!("{}", generate_run_report(&summary));
            println!(
                "\n{} Process completed successfully. Output file: {}",
                "✓".green().bold(),
                summary.output.display().to_string().bright_white()
            );
            println!("{} Elapsed time: {}", "→".blue(), format_elapsed(start.elapsed()));
        }
        Err(e) => report_failure(&e, start.elapsed()),
    }
}

pub async fn handle_parse(sub_matches: &ArgMatches) {
    let start = Instant::now();
    let config = base_config(sub_matches);

    println!("\n{} Listing sitemap URLs", "🗺".bright_cyan());
    print_source(&config);
    println!();

    let scraper = match Scraper::new(config) {
        Ok(scraper) => scraper,
        Err(e) => {
            report_failure(&e, start.elapsed());
            return;
        }
    };

    match scraper.collect_urls().await {
        Ok(records) => {
            print!("{}", generate_url_listing(&records));
            println!("\n{} Elapsed time: {}", "→".blue(), format_elapsed(start.elapsed()));
        }
        Err(e) => report_failure(&e, start.elapsed()),
    }
}
