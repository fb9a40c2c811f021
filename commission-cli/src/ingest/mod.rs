//! Row Source layer: file readers producing uniform rows
//!
//! Both readers turn their input into an ordered sequence of [`SourceRow`]s
//! so the pipeline never deals with file formats directly. Column names are
//! normalized here; a malformed file fails before any row is processed.

pub mod csv;
pub mod excel;

use std::collections::HashMap;

/// Column names the pipeline expects after header normalization
pub mod columns {
    pub const PARTNER: &str = "partner";
    pub const LOCATION: &str = "location";
    pub const CUSTOMER: &str = "customer";
    pub const PROVIDER: &str = "provider";
    pub const SERVICE: &str = "service";
    pub const MRC: &str = "mrc";
    pub const PCT: &str = "pct";
}

/// A single cell value from a CSV or Excel source
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing or blank cell
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Natural-key form of the cell; missing cells become the empty string
    pub fn key_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One input row: normalized column name -> cell value
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    cells: HashMap<String, CellValue>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Get a cell by column name; missing columns read as `Empty`
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Natural-key string for a column (empty string when missing)
    pub fn key(&self, column: &str) -> String {
        self.get(column).key_string()
    }

    /// True when every cell in the row is empty
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.is_empty())
    }
}

/// Normalize a header cell: trim whitespace and lowercase
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}
