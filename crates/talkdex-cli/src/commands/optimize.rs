use anyhow::{Context, Result};
use std::path::Path;

use talkdex_core::storage::SegmentStore;
use talkdex_sqlite::SqliteStore;

use crate::output;

pub async fn execute(db: &Path) -> Result<()> {
    let store = SqliteStore::open_existing(db).with_context(|| format!("Failed to open database {}", db.display()))?;

    let stats = store.optimize().await;
    store.close().context("Failed to close database")?;
    let stats = stats.context("Optimization failed")?;

    println!("Database: {}\n", db.display());
    println!("{}", output::optimize_table(&stats));
    println!(
        "\nReclaimed {} in {:.2}s",
        output::format_bytes(stats.reclaimed_bytes()),
        stats.duration.as_secs_f64()
    );
    Ok(())
}
