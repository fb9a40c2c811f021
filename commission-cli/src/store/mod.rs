//! Storage contract and backends
//!
//! The pipeline takes the store as an explicit dependency so it can run
//! against SQLite in production and an in-memory store in dry runs and
//! tests. Each call is an independent operation: no transactions, retries
//! or locking are layered on top.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::pipeline::DimensionKind;

/// New order row, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub service_id: i64,
    pub provider_id: i64,
    pub location_id: i64,
    pub mrc: f64,
}

/// New commission row referencing an already-inserted order
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommission {
    pub service_id: i64,
    pub provider_id: i64,
    pub partner_id: i64,
    pub location_id: i64,
    pub order_id: i64,
    pub pct: f64,
}

/// Storage interface consumed by the pipeline
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up a dimension row by its natural key
    async fn find_dimension(&self, kind: DimensionKind, key: &str) -> Result<Option<i64>>;

    /// Insert a dimension row, returning the generated id
    async fn insert_dimension(&self, kind: DimensionKind, key: &str) -> Result<i64>;

    /// Insert an order row, returning the generated id
    async fn insert_order(&self, order: &NewOrder) -> Result<i64>;

    /// Insert a commission row, returning the generated id
    async fn insert_commission(&self, commission: &NewCommission) -> Result<i64>;
}
