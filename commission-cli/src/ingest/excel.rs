//! Read rows from Excel workbooks
//!
//! The first sheet is used; its first row is treated as the header row and
//! the remaining rows become data.

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use super::{CellValue, SourceRow, normalize_header};

/// Read rows from an Excel file (.xlsx or .xls)
pub fn read_excel_file<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Excel workbook has no sheets")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        bail!("Excel sheet '{}' is empty", sheet_name);
    };

    // Blank header cells are skipped entirely
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            Data::String(s) => normalize_header(s),
            other => normalize_header(&other.to_string()),
        })
        .collect();

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let mut row = SourceRow::new();
        for (col_idx, cell) in data_row.iter().enumerate() {
            let Some(header) = headers.get(col_idx) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            row.insert(header.clone(), cell_to_value(cell));
        }

        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Convert an Excel cell into a source cell value
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => {
            // Whole numbers come back as floats from Excel
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(format!("{}", dt)),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_value_basic_types() {
        assert_eq!(cell_to_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_to_value(&Data::String("".into())), CellValue::Empty);
        assert_eq!(
            cell_to_value(&Data::String("Acme".into())),
            CellValue::Text("Acme".into())
        );
        assert_eq!(cell_to_value(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(cell_to_value(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_cell_to_value_whole_floats_become_ints() {
        assert_eq!(cell_to_value(&Data::Float(100.0)), CellValue::Int(100));
        assert_eq!(cell_to_value(&Data::Float(2.5)), CellValue::Float(2.5));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = read_excel_file("does-not-exist.xlsx");
        assert!(result.is_err());
    }
}
