//! Dimension resolution: idempotent lookup-or-create by natural key
//!
//! Each of the five dimension entities is deduplicated by a human-meaningful
//! key (name or address). Resolution performs exactly one lookup and at most
//! one insert per call; results are never cached or merged across calls.

use crate::ingest::columns;
use crate::store::Store;

use super::error::RowError;

/// The five dimension entities, each deduplicated by a natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    Partner,
    Location,
    Customer,
    Provider,
    Service,
}

impl DimensionKind {
    /// Fixed per-row resolution order (kept stable for determinism)
    pub const RESOLUTION_ORDER: [DimensionKind; 5] = [
        DimensionKind::Partner,
        DimensionKind::Location,
        DimensionKind::Customer,
        DimensionKind::Provider,
        DimensionKind::Service,
    ];

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            DimensionKind::Partner => "partners",
            DimensionKind::Location => "locations",
            DimensionKind::Customer => "customers",
            DimensionKind::Provider => "providers",
            DimensionKind::Service => "services",
        }
    }

    /// Natural-key column in the backing table
    pub fn key_column(&self) -> &'static str {
        match self {
            DimensionKind::Location => "address",
            _ => "name",
        }
    }

    /// Display label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            DimensionKind::Partner => "Partner",
            DimensionKind::Location => "Location",
            DimensionKind::Customer => "Customer",
            DimensionKind::Provider => "Provider",
            DimensionKind::Service => "Service",
        }
    }

    /// Source column holding this kind's natural key
    pub fn source_column(&self) -> &'static str {
        match self {
            DimensionKind::Partner => columns::PARTNER,
            DimensionKind::Location => columns::LOCATION,
            DimensionKind::Customer => columns::CUSTOMER,
            DimensionKind::Provider => columns::PROVIDER,
            DimensionKind::Service => columns::SERVICE,
        }
    }
}

impl std::fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of resolving one dimension value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDimension {
    pub id: i64,
    /// True when the row was inserted by this call
    pub created: bool,
}

/// Fully resolved dimension ids for one input row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedDimensions {
    pub partner_id: i64,
    pub location_id: i64,
    pub customer_id: i64,
    pub provider_id: i64,
    pub service_id: i64,
}

impl ResolvedDimensions {
    pub fn set(&mut self, kind: DimensionKind, id: i64) {
        match kind {
            DimensionKind::Partner => self.partner_id = id,
            DimensionKind::Location => self.location_id = id,
            DimensionKind::Customer => self.customer_id = id,
            DimensionKind::Provider => self.provider_id = id,
            DimensionKind::Service => self.service_id = id,
        }
    }
}

/// Count of newly created dimension rows, by kind
///
/// Lookups that hit an existing row do not count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionTally {
    pub partners: usize,
    pub locations: usize,
    pub customers: usize,
    pub providers: usize,
    pub services: usize,
}

impl DimensionTally {
    pub fn record(&mut self, kind: DimensionKind) {
        match kind {
            DimensionKind::Partner => self.partners += 1,
            DimensionKind::Location => self.locations += 1,
            DimensionKind::Customer => self.customers += 1,
            DimensionKind::Provider => self.providers += 1,
            DimensionKind::Service => self.services += 1,
        }
    }
}

/// Look up a dimension row by natural key, inserting it if absent.
///
/// Exactly one lookup and at most one insert per call. Two resolutions of
/// the same new value that both observe an empty lookup will both insert;
/// that duplicate-creation race is a documented limitation of the
/// lookup-then-insert scheme, not something this function prevents.
pub async fn resolve_dimension(
    store: &dyn Store,
    kind: DimensionKind,
    key: &str,
) -> Result<ResolvedDimension, RowError> {
    let existing = store
        .find_dimension(kind, key)
        .await
        .map_err(|e| RowError::dimension(kind, &e))?;

    if let Some(id) = existing {
        return Ok(ResolvedDimension { id, created: false });
    }

    let id = store
        .insert_dimension(kind, key)
        .await
        .map_err(|e| RowError::dimension(kind, &e))?;

    log::debug!("Created {} '{}' with id {}", kind.label(), key, id);
    Ok(ResolvedDimension { id, created: true })
}
