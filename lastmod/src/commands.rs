use clap::{arg, command};
use lastmod_core::config::{DEFAULT_EXCLUDE_PATTERN, DEFAULT_FILE_PREFIX, DEFAULT_SITEMAP_URL};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn url_arg() -> clap::Arg {
    arg!(-u --"url" <URL>)
        .required(false)
        .help("The sitemap to audit")
        .value_parser(clap::value_parser!(Url))
        .default_value(DEFAULT_SITEMAP_URL)
}

fn exclude_arg() -> clap::Arg {
    arg!(-e --"exclude" <REGEX>)
        .required(false)
        .help("Skip sitemap entries whose URL starts with a match for this pattern (empty: keep all)")
        .default_value(DEFAULT_EXCLUDE_PATTERN)
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("lastmod")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("lastmod")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log every request and which metadata matched").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scrape")
                .about(
                    "Fetch a sitemap, probe each page for its last-modified date and write \
                the results to CSV.",
                )
                .arg(url_arg())
                .arg(exclude_arg())
                .arg(
                    arg!(-m --"max-urls" <N>)
                        .required(false)
                        .help("Maximum number of pages to probe (0: no limit)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(-d --"delay-ms" <MS>)
                        .required(false)
                        .help("Pause between page probes, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("750"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for each page HEAD/GET request")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"sitemap-timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for the sitemap request")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("30"),
                )
                .arg(
                    arg!(-A --"user-agent" <UA>)
                        .required(false)
                        .help("User-Agent sent with every request (default: desktop Chrome)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("CSV file to write (default: <temp dir>/<prefix>-<epoch>.csv)"),
                )
                .arg(
                    arg!(--"prefix" <PREFIX>)
                        .required(false)
                        .help("File name prefix for the generated output path")
                        .default_value(DEFAULT_FILE_PREFIX),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Do not draw a progress bar")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("parse")
                .about("Fetch and filter the sitemap, then list the URLs a scrape would probe.")
                .arg(url_arg())
                .arg(exclude_arg()),
        )
}
