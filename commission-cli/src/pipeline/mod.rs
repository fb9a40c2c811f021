//! Row-level ETL pipeline core
//!
//! Turns loosely-typed spreadsheet rows into a normalized relational graph:
//! five dimension entities resolved by natural key (lookup-or-create),
//! then an order and a commission fact row per input row. Rows fail in
//! isolation; the batch always runs to completion and reports a summary.

pub mod batch;
pub mod error;
pub mod facts;
pub mod resolver;

pub use batch::{BatchReport, RowFailure, RowSuccess, process_batch, process_row};
pub use error::RowError;
pub use facts::{FactIds, coerce_decimal, write_facts};
pub use resolver::{DimensionKind, DimensionTally, ResolvedDimensions, resolve_dimension};
