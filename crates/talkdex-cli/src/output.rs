//! Summary tables printed at the end of a command

use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use std::time::Duration;

use talkdex_core::storage::{DbStats, IntegrityReport, OptimizeStats, QueryTiming};
use talkdex_pipeline::IngestReport;

/// Human-readable byte size
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
    }
}

/// Run counts, skip reasons and final store size
pub fn ingest_summary(report: &IngestReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);

    table.add_row(vec![Cell::new("Discovered"), Cell::new(report.discovered)]);
    table.add_row(vec![
        Cell::new("Processed"),
        Cell::new(report.processed).fg(Color::Green),
    ]);
    let skipped = Cell::new(report.total_skipped());
    table.add_row(vec![
        Cell::new("Skipped"),
        if report.total_skipped() > 0 {
            skipped.fg(Color::Yellow)
        } else {
            skipped
        },
    ]);
    for (reason, count) in &report.skipped {
        table.add_row(vec![Cell::new(format!("  {}", reason)), Cell::new(count)]);
    }
    table.add_row(vec![Cell::new("Segments stored"), Cell::new(report.segments_stored)]);
    let degraded = Cell::new(report.degraded_segments);
    table.add_row(vec![
        Cell::new("Fallback embeddings"),
        if report.degraded_segments > 0 {
            degraded.fg(Color::Yellow)
        } else {
            degraded
        },
    ]);
    table.add_row(vec![Cell::new("Batches committed"), Cell::new(report.batches_committed)]);
    table.add_row(vec![Cell::new("Resume cursor"), Cell::new(report.resume_cursor)]);
    if let Some(size) = report.final_size_bytes() {
        table.add_row(vec![Cell::new("Final store size"), Cell::new(format_bytes(size))]);
    }
    table.add_row(vec![Cell::new("Duration"), Cell::new(format_duration(report.duration))]);
    table.add_row(vec![
        Cell::new("Fatal aborts"),
        match &report.fatal {
            Some(_) => Cell::new(1).fg(Color::Red),
            None => Cell::new(0),
        },
    ]);
    table
}

/// Page and row statistics
pub fn stats_table(stats: &DbStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Statistic", "Value"]);
    table.add_row(vec![Cell::new("Videos"), Cell::new(stats.video_count)]);
    table.add_row(vec![Cell::new("Segments"), Cell::new(stats.segment_count)]);
    table.add_row(vec![
        Cell::new("Fallback embeddings"),
        Cell::new(stats.degraded_segment_count),
    ]);
    table.add_row(vec![Cell::new("Pages"), Cell::new(stats.page_count)]);
    table.add_row(vec![Cell::new("Free pages"), Cell::new(stats.freelist_count)]);
    table.add_row(vec![Cell::new("Size"), Cell::new(format_bytes(stats.total_size_bytes))]);
    table
}

pub fn optimize_table(stats: &OptimizeStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "Before", "After"]);
    table.add_row(vec![
        Cell::new("Size"),
        Cell::new(format_bytes(stats.before.total_size_bytes)),
        Cell::new(format_bytes(stats.after.total_size_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("Free pages"),
        Cell::new(stats.before.freelist_count),
        Cell::new(stats.after.freelist_count),
    ]);
    table
}

/// Per-query timings from an integrity check
pub fn timings_table(timings: &[QueryTiming]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Query", "Rows", "Time"]);
    for timing in timings {
        table.add_row(vec![
            Cell::new(&timing.name),
            Cell::new(timing.rows),
            Cell::new(format_duration(timing.duration)),
        ]);
    }
    table
}

/// One-line verdict plus any problems
pub fn integrity_verdict(report: &IntegrityReport) -> String {
    if report.ok {
        format!("{} Integrity check passed", "✓".green())
    } else {
        let mut out = format!("{} Integrity check failed", "✗".red());
        for problem in &report.problems {
            out.push_str(&format!("\n  - {}", problem));
        }
        out
    }
}
