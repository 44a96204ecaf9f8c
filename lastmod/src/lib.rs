pub mod commands;
pub mod handlers;

// Re-export the pieces the binary and integration tests reach for
pub use commands::command_argument_builder;
pub use handlers::{base_config, expand_output_path, scrape_config};

pub use lastmod_core::{RunSummary, ScrapeConfig, Scraper};
