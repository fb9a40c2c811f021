//! Import command handler
//!
//! Thin I/O shell around the pipeline: picks a reader by file extension,
//! opens the store, runs the batch and renders the summary.

use anyhow::{Context, Result, bail};
use colored::*;

use super::ImportArgs;
use crate::ingest::{self, SourceRow};
use crate::pipeline::{BatchReport, process_batch};
use crate::store::{MemoryStore, SqliteStore};

/// Maximum number of row errors shown in the rendered summary
const MAX_RENDERED_ERRORS: usize = 5;

pub async fn handle_import_command(args: ImportArgs) -> Result<()> {
    let rows = read_rows(&args)?;

    if rows.is_empty() {
        println!("{}", "No data rows found, nothing to import".yellow());
        return Ok(());
    }

    log::info!("Importing {} rows from {}", rows.len(), args.file.display());

    let report = if args.dry_run {
        let store = MemoryStore::new();
        process_batch(&store, &rows).await
    } else {
        let store = SqliteStore::open(&args.database).await?;
        process_batch(&store, &rows).await
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize batch report")?
        );
    } else {
        render_report(&report, args.dry_run);
    }

    Ok(())
}

/// Read the input file into uniform rows, dispatching on extension
fn read_rows(args: &ImportArgs) -> Result<Vec<SourceRow>> {
    let extension = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            if !args.delimiter.is_ascii() {
                bail!("CSV delimiter must be a single ASCII character");
            }
            ingest::csv::read_csv_file(&args.file, args.delimiter as u8)
        }
        "xlsx" | "xls" => ingest::excel::read_excel_file(&args.file),
        _ => bail!("Unsupported file format. Use CSV, XLS or XLSX."),
    }
}

fn render_report(report: &BatchReport, dry_run: bool) {
    if dry_run {
        println!("{}", "Dry run complete (nothing persisted)".cyan().bold());
    } else {
        println!("{}", "Import complete".green().bold());
    }

    for line in summary_lines(report) {
        println!("  {}", line);
    }

    if !report.errors.is_empty() {
        println!("{}", "Errors:".red().bold());
        for line in error_lines(report) {
            println!("  {}", line.red());
        }
    }
}

/// Counter lines of the summary, in the order the counters are reported
fn summary_lines(report: &BatchReport) -> Vec<String> {
    vec![
        format!("Partners created:    {}", report.partners),
        format!("Locations created:   {}", report.locations),
        format!("Customers created:   {}", report.customers),
        format!("Providers created:   {}", report.providers),
        format!("Services created:    {}", report.services),
        format!("Orders created:      {}", report.orders),
        format!("Commissions created: {}", report.commissions),
    ]
}

/// Error lines, truncated to the first few with an overflow count
fn error_lines(report: &BatchReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .errors
        .iter()
        .take(MAX_RENDERED_ERRORS)
        .cloned()
        .collect();

    if report.errors.len() > MAX_RENDERED_ERRORS {
        lines.push(format!(
            "... and {} more errors",
            report.errors.len() - MAX_RENDERED_ERRORS
        ));
    }

    lines
}
