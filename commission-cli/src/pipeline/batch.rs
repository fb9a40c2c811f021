//! Batch orchestration: sequential row processing with error isolation
//!
//! Rows are processed strictly in input order, one at a time; no row's
//! store operations begin before the previous row has concluded. A row
//! failure is recorded and the batch moves on; the batch never aborts early.

use serde::Serialize;

use crate::ingest::{SourceRow, columns};
use crate::store::Store;

use super::error::RowError;
use super::facts::write_facts;
use super::resolver::{
    DimensionKind, DimensionTally, ResolvedDimensions, resolve_dimension,
};

/// Summary of one batch run
///
/// Dimension counters reflect only newly created rows, not lookups that hit
/// an existing row. Error messages are ordered by ascending row index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub partners: usize,
    pub locations: usize,
    pub customers: usize,
    pub providers: usize,
    pub services: usize,
    pub orders: usize,
    pub commissions: usize,
    pub errors: Vec<String>,
}

impl BatchReport {
    fn absorb_tally(&mut self, tally: &DimensionTally) {
        self.partners += tally.partners;
        self.locations += tally.locations;
        self.customers += tally.customers;
        self.providers += tally.providers;
        self.services += tally.services;
    }

    /// Number of rows that failed
    pub fn failed_rows(&self) -> usize {
        self.errors.len()
    }
}

/// What a successfully processed row contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSuccess {
    pub created: DimensionTally,
}

/// A failed row, with whatever it persisted before failing
///
/// Earlier writes are not rolled back: dimensions created before the
/// failing stage keep counting, and an order written before a commission
/// failure stays persisted and counted.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub created: DimensionTally,
    pub order_written: bool,
    pub error: RowError,
}

/// Process all rows and fold the per-row results into a batch report
pub async fn process_batch(store: &dyn Store, rows: &[SourceRow]) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, row) in rows.iter().enumerate() {
        match process_row(store, row).await {
            Ok(success) => {
                report.absorb_tally(&success.created);
                report.orders += 1;
                report.commissions += 1;
            }
            Err(failure) => {
                report.absorb_tally(&failure.created);
                if failure.order_written {
                    report.orders += 1;
                }
                let message = format!("Row {}: {}", index + 1, failure.error);
                log::warn!("{}", message);
                report.errors.push(message);
            }
        }
    }

    log::info!(
        "Batch complete: {} orders, {} commissions, {} failed rows",
        report.orders,
        report.commissions,
        report.failed_rows()
    );
    report
}

/// Process one row: resolve the five dimensions in fixed order, then write
/// the order and commission facts.
pub async fn process_row(store: &dyn Store, row: &SourceRow) -> Result<RowSuccess, RowFailure> {
    let mut created = DimensionTally::default();
    let mut dims = ResolvedDimensions::default();

    for kind in DimensionKind::RESOLUTION_ORDER {
        let key = row.key(kind.source_column());
        let resolved = match resolve_dimension(store, kind, &key).await {
            Ok(resolved) => resolved,
            Err(error) => {
                return Err(RowFailure {
                    created,
                    order_written: false,
                    error,
                });
            }
        };
        if resolved.created {
            created.record(kind);
        }
        dims.set(kind, resolved.id);
    }

    match write_facts(store, &dims, row.get(columns::MRC), row.get(columns::PCT)).await {
        Ok(_) => Ok(RowSuccess { created }),
        Err(error) => {
            // Commission failures leave the already-inserted order behind
            let order_written = matches!(error, RowError::Commission { .. });
            Err(RowFailure {
                created,
                order_written,
                error,
            })
        }
    }
}
