use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use talkdex_config::{ConfigLoader, TalkdexConfig};
use talkdex_core::source::SourceSelector;
use talkdex_enrichment::create_enrichment_service;
use talkdex_llm::create_generator;
use talkdex_pipeline::{CancellationToken, IngestReport, IngestionOrchestrator, ManifestSource};
use talkdex_sqlite::{SqliteConfig, SqliteStore};

use crate::cli::IngestArgs;
use crate::output;

/// Fold command-line flags into the loaded configuration
pub fn apply_overrides(config: &mut TalkdexConfig, args: &IngestArgs) {
    if let Some(output) = &args.output {
        config.storage.path = output.clone();
    }
    if let Some(max) = args.max_videos {
        config.pipeline.max_videos = Some(max);
    }
    if let Some(batch_size) = args.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(start_at) = args.start_at {
        config.pipeline.start_at = start_at;
    }
    if args.skip_unchanged {
        config.pipeline.skip_unchanged = true;
    }
}

/// Which manifest videos to ingest
pub fn selector(args: &IngestArgs) -> SourceSelector {
    match (&args.channel, &args.playlist) {
        (Some(channel), _) => SourceSelector::Channel(channel.trim().to_string()),
        (None, Some(playlist)) => SourceSelector::Playlist(playlist.trim().to_string()),
        (None, None) => SourceSelector::All,
    }
}

pub async fn execute(config_path: Option<&Path>, args: IngestArgs) -> Result<()> {
    let mut config = ConfigLoader::load_or_default(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate_for_ingest().context("Invalid configuration")?;

    let source = Arc::new(ManifestSource::load(&args.manifest).await?);
    let generator = create_generator(&config.embedding).context("Failed to create embedding provider")?;
    let enrichment = create_enrichment_service(&config.enrichment, None);
    let store = SqliteStore::open(SqliteConfig::from_storage_config(
        &config.storage,
        config.embedding.dimensions,
    ))
    .with_context(|| format!("Failed to open database {}", config.storage.path.display()))?;

    let selector = selector(&args);
    info!(
        manifest = %args.manifest.display(),
        output = %config.storage.path.display(),
        selector = %selector,
        "Starting ingest"
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing the current video");
                cancel.cancel();
            }
        })
    };

    let report = IngestionOrchestrator::new(&store, source, enrichment, generator, config.pipeline.clone())
        .run(&selector, &cancel)
        .await;
    interrupt.abort();

    let closed = store.close();
    print_report(&report);
    closed.context("Failed to close database")?;

    match report.fatal {
        Some(e) => Err(anyhow::Error::new(e).context(format!(
            "Ingestion aborted; re-run with --start-at {} to resume",
            report.resume_cursor
        ))),
        None => Ok(()),
    }
}

fn print_report(report: &IngestReport) {
    println!("Ingestion Summary\n");
    println!("{}", output::ingest_summary(report));

    if let Some(integrity) = &report.integrity {
        println!("\n{}", output::integrity_verdict(integrity));
        if !integrity.timings.is_empty() {
            println!("\n{}", output::timings_table(&integrity.timings));
        }
    }
    if report.cancelled {
        println!(
            "\nRun cancelled; resume with --start-at {}",
            report.resume_cursor
        );
    }
}
