//! Read rows from delimited text files
//!
//! The default delimiter is `;` (the files this tool ingests are
//! semicolon-separated exports), configurable from the CLI. Fields are
//! dynamically typed: numeric and boolean cells become typed values.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use super::{CellValue, SourceRow, normalize_header};

/// Read rows from a CSV file using the given field delimiter
pub fn read_csv_file<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    let reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    read_rows(reader)
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<SourceRow>> {
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;

        let mut row = SourceRow::new();
        for (col_idx, field) in record.iter().enumerate() {
            let Some(header) = headers.get(col_idx) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            row.insert(header.clone(), parse_field(field));
        }

        // skip fully empty lines
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Type a raw CSV field: integers, floats and booleans become typed cells,
/// everything else stays text. Blank fields are empty cells.
fn parse_field(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    match trimmed.to_lowercase().as_str() {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::Text(raw.to_string()),
    }
}
