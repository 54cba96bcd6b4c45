use anyhow::{bail, Context, Result};
use std::path::Path;

use talkdex_core::storage::SegmentStore;
use talkdex_sqlite::SqliteStore;

use crate::output;

pub async fn execute(db: &Path) -> Result<()> {
    let store = SqliteStore::open_existing(db).with_context(|| format!("Failed to open database {}", db.display()))?;

    let report = store.verify().await;
    let stats = store.stats().await;
    store.close().context("Failed to close database")?;

    let report = report.context("Integrity check could not run")?;
    println!("Database: {}\n", db.display());
    if let Ok(stats) = stats {
        println!("{}\n", output::stats_table(&stats));
    }
    println!("{}", output::timings_table(&report.timings));
    println!("\n{}", output::integrity_verdict(&report));

    if !report.ok {
        bail!("{} integrity problem(s) found", report.problems.len());
    }
    Ok(())
}
