//! talkdex command-line interface
//!
//! Argument parsing, logging bootstrap and summary output. All ingestion logic
//! lives in `talkdex-pipeline`.

pub mod cli;
pub mod commands;
pub mod output;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise every talkdex crate logs at the CLI
/// level and dependencies at `warn`.
pub fn init_logging(cli: &cli::Cli) {
    let level = cli.level_filter();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,talkdex_cli={level},talkdex_pipeline={level},talkdex_llm={level},\
             talkdex_enrichment={level},talkdex_sqlite={level},talkdex_config={level}",
            level = level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
