use lastmod::command_argument_builder;
use lastmod::handlers::{handle_parse, handle_scrape, init_tracing};
use lastmod_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    init_tracing(verbose);

    match chosen_command.subcommand() {
        Some(("scrape", primary_command)) => handle_scrape(primary_command).await,
        Some(("parse", primary_command)) => handle_parse(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
