//! Post-load optimisation and integrity verification

use rusqlite::Connection;
use std::time::Instant;
use tracing::{debug, info, warn};

use talkdex_core::storage::{IntegrityReport, OptimizeStats, QueryTiming};

use crate::connection::stats;
use crate::error::SqliteResult;

/// Refresh the FTS index and statistics, then reclaim space
///
/// Safe on an empty store and idempotent.
pub(crate) fn optimize(conn: &Connection, is_memory: bool) -> SqliteResult<OptimizeStats> {
    let started = Instant::now();
    let before = stats(conn)?;

    conn.execute_batch("INSERT INTO segments_fts(segments_fts) VALUES ('optimize');")?;
    conn.execute_batch("ANALYZE;")?;
    conn.execute_batch("PRAGMA optimize;")?;
    conn.execute_batch("VACUUM;")?;
    if !is_memory {
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
    }

    let after = stats(conn)?;
    let result = OptimizeStats {
        before,
        after,
        duration: started.elapsed(),
    };
    info!(
        reclaimed_bytes = result.reclaimed_bytes(),
        size_bytes = result.after.total_size_bytes,
        duration_ms = result.duration.as_millis() as u64,
        "Database optimized"
    );
    Ok(result)
}

/// Run every integrity check and time the sample queries
pub(crate) fn verify(conn: &Connection, dimensions: usize) -> SqliteResult<IntegrityReport> {
    let mut problems = Vec::new();
    let mut timings = Vec::new();

    // PRAGMA integrity_check returns a single "ok" row when healthy
    let (rows, timing) = timed("integrity_check", || {
        let mut stmt = conn.prepare("PRAGMA integrity_check;")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    timings.push(timing);
    problems.extend(rows.into_iter().filter(|r| r != "ok"));

    let (rows, timing) = timed("foreign_key_check", || {
        let mut stmt = conn.prepare("PRAGMA foreign_key_check;")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(format!(
                    "foreign key violation in {} row {} referencing {}",
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
                    row.get::<_, String>(2)?
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    timings.push(timing);
    problems.extend(rows);

    // rank = 1 also compares the index against the content table
    let started = Instant::now();
    if let Err(e) =
        conn.execute_batch("INSERT INTO segments_fts(segments_fts, rank) VALUES ('integrity-check', 1);")
    {
        problems.push(format!("full-text index out of sync: {}", e));
    }
    timings.push(QueryTiming {
        name: "fts_integrity_check".to_string(),
        duration: started.elapsed(),
        rows: 0,
    });

    let (bad, timing) = timed("embedding_length_check", || {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM segments WHERE embedding_dim != ?1 OR length(embedding) != 4 * ?1",
            [dimensions as i64],
            |row| row.get::<_, i64>(0),
        )?)
    })?;
    timings.push(timing);
    if bad > 0 {
        problems.push(format!("{} segments do not have {}-dimension embeddings", bad, dimensions));
    }

    timings.extend(sample_query_timings(conn)?);

    if problems.is_empty() {
        debug!(checks = timings.len(), "Integrity check passed");
        Ok(IntegrityReport::passed(timings))
    } else {
        warn!(problems = problems.len(), "Integrity check failed");
        Ok(IntegrityReport::failed(problems, timings))
    }
}

/// Representative read queries, timed for the run summary
fn sample_query_timings(conn: &Connection) -> SqliteResult<Vec<QueryTiming>> {
    let mut timings = Vec::new();

    let (_, t) = timed("count_videos", || {
        Ok(conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get::<_, i64>(0))?)
    })?;
    timings.push(t);

    let (_, t) = timed("count_segments", || {
        Ok(conn.query_row("SELECT COUNT(*) FROM segments", [], |row| row.get::<_, i64>(0))?)
    })?;
    timings.push(t);

    let (_, t) = timed("fts_match", || {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM segments_fts WHERE segments_fts MATCH ?1",
            ["data"],
            |row| row.get::<_, i64>(0),
        )?)
    })?;
    timings.push(t);

    let (_, t) = timed("segment_lookup", || {
        let mut stmt = conn.prepare(
            "SELECT segment_id, start_secs, end_secs FROM segments
             WHERE video_id = (SELECT video_id FROM videos ORDER BY video_id LIMIT 1)
             ORDER BY ordinal",
        )?;
        let n = stmt.query_map([], |_| Ok(()))?.count();
        Ok(n as i64)
    })?;
    timings.push(t);

    Ok(timings)
}

/// Run `f`, returning its value and a timing whose `rows` is the value when it is a count
fn timed<T, F>(name: &str, f: F) -> SqliteResult<(T, QueryTiming)>
where
    F: FnOnce() -> SqliteResult<T>,
    T: RowCount,
{
    let started = Instant::now();
    let value = f()?;
    let timing = QueryTiming {
        name: name.to_string(),
        duration: started.elapsed(),
        rows: value.row_count(),
    };
    Ok((value, timing))
}

trait RowCount {
    fn row_count(&self) -> u64;
}

impl RowCount for i64 {
    fn row_count(&self) -> u64 {
        (*self).max(0) as u64
    }
}

impl<T> RowCount for Vec<T> {
    fn row_count(&self) -> u64 {
        self.len() as u64
    }
}
