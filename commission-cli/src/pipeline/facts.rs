//! Fact writes: one order and one commission per successful row
//!
//! Facts are always inserted, never looked up. The commission is only
//! attempted after the order insert succeeds, and a commission failure
//! leaves the order persisted (no compensating delete).

use crate::ingest::CellValue;
use crate::store::{NewCommission, NewOrder, Store};

use super::error::RowError;
use super::resolver::ResolvedDimensions;

/// Ids of the fact rows written for one input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactIds {
    pub order_id: i64,
    pub commission_id: i64,
}

/// Coerce a raw cell into the decimal the pipeline persists.
///
/// Unparseable values become a NaN sentinel and are persisted as-is; rows
/// are never rejected for bad numeric fields. Whether they should be is an
/// open product decision, so the behavior is pinned here rather than fixed.
pub fn coerce_decimal(value: &CellValue) -> f64 {
    match value {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        CellValue::Empty | CellValue::Bool(_) => f64::NAN,
    }
}

/// Insert the order and then the commission for one row
pub async fn write_facts(
    store: &dyn Store,
    dims: &ResolvedDimensions,
    raw_mrc: &CellValue,
    raw_pct: &CellValue,
) -> Result<FactIds, RowError> {
    let order = NewOrder {
        customer_id: dims.customer_id,
        service_id: dims.service_id,
        provider_id: dims.provider_id,
        location_id: dims.location_id,
        mrc: coerce_decimal(raw_mrc),
    };

    let order_id = store
        .insert_order(&order)
        .await
        .map_err(|e| RowError::order(&e))?;

    let commission = NewCommission {
        service_id: dims.service_id,
        provider_id: dims.provider_id,
        partner_id: dims.partner_id,
        location_id: dims.location_id,
        order_id,
        pct: coerce_decimal(raw_pct),
    };

    let commission_id = store
        .insert_commission(&commission)
        .await
        .map_err(|e| RowError::commission(&e))?;

    Ok(FactIds {
        order_id,
        commission_id,
    })
}
