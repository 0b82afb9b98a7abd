use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_error, engine_info, engine_warn};
use linkcheck_engine::{BatchOutcome, RowVerdict, VerdictCounts};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use super::settings::AppSettings;

pub fn counts_of(rows: &[RowVerdict]) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for row in rows {
        counts.record(&row.verdict);
    }
    counts
}

pub fn log_summary(outcome: &BatchOutcome, elapsed: Duration) {
    let counts = counts_of(outcome.processed());
    match outcome {
        BatchOutcome::Completed(_) => engine_info!(
            "Validation completed in {:.2}s: {} rows checked",
            elapsed.as_secs_f64(),
            counts.total()
        ),
        BatchOutcome::Stopped { processed, total } => engine_warn!(
            "Validation stopped after {:.2}s: {}/{} rows checked, nothing written",
            elapsed.as_secs_f64(),
            processed.len(),
            total
        ),
    }
    engine_info!("Valid: {}", counts.valid);
    engine_warn!("Review: {}", counts.review);
    engine_error!("Invalid: {}", counts.invalid);
    engine_info!("Skipped: {}", counts.skipped);
}

pub fn build_report(
    input: &Path,
    settings: &AppSettings,
    outcome: &BatchOutcome,
    elapsed: Duration,
) -> Value {
    let counts = counts_of(outcome.processed());
    let (status, total) = match outcome {
        BatchOutcome::Completed(report) => ("completed", report.verdicts.len()),
        BatchOutcome::Stopped { total, .. } => ("stopped", *total),
    };
    let rows: Vec<Value> = outcome
        .processed()
        .iter()
        .map(|row| {
            json!({
                "row": row.row_id,
                "value": row.raw_value.as_text(),
                "result": row.verdict.sheet_token(),
                "detail": row.verdict.detail(),
                "checked_at": row.checked_at,
            })
        })
        .collect();

    json!({
        "input": input.display().to_string(),
        "column": settings.column,
        "status_column": settings.status_column,
        "start_row": settings.start_row,
        "end_row": settings.end_row,
        "status": status,
        "total": total,
        "elapsed_secs": elapsed.as_secs_f64(),
        "counts": {
            "valid": counts.valid,
            "invalid": counts.invalid,
            "review": counts.review,
            "skipped": counts.skipped,
        },
        "rows": rows,
    })
}

pub fn write_report(path: &Path, report: &Value) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), report)?;
    tmp.as_file_mut().write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("saving report {}", path.display()))?;
    engine_info!("Report written to {:?}", path);
    Ok(())
}
