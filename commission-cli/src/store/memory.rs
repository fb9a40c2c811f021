//! In-memory store for dry runs and tests
//!
//! Mirrors the relational backend's behavior where it matters to the
//! pipeline: generated integer ids, rejection of empty natural keys, and a
//! commission insert that requires an existing order.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::pipeline::DimensionKind;

use super::{NewCommission, NewOrder, Store};

/// A dimension row held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRow {
    pub id: i64,
    pub key: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    dimensions: HashMap<DimensionKind, Vec<DimensionRow>>,
    orders: Vec<(i64, NewOrder)>,
    commissions: Vec<(i64, NewCommission)>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store keeping all rows in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all rows of one dimension kind
    pub fn dimension_rows(&self, kind: DimensionKind) -> Vec<DimensionRow> {
        let inner = self.inner.lock().unwrap();
        inner.dimensions.get(&kind).cloned().unwrap_or_default()
    }

    /// Number of rows of one dimension kind
    pub fn dimension_count(&self, kind: DimensionKind) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.dimensions.get(&kind).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Snapshot of all order rows as (id, fields)
    pub fn orders(&self) -> Vec<(i64, NewOrder)> {
        self.inner.lock().unwrap().orders.clone()
    }

    /// Snapshot of all commission rows as (id, fields)
    pub fn commissions(&self) -> Vec<(i64, NewCommission)> {
        self.inner.lock().unwrap().commissions.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_dimension(&self, kind: DimensionKind, key: &str) -> Result<Option<i64>> {
        let inner = self.inner.lock().unwrap();
        let id = inner
            .dimensions
            .get(&kind)
            .and_then(|rows| rows.iter().find(|row| row.key == key))
            .map(|row| row.id);
        Ok(id)
    }

    async fn insert_dimension(&self, kind: DimensionKind, key: &str) -> Result<i64> {
        if key.trim().is_empty() {
            bail!("natural key must not be empty");
        }

        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.dimensions.entry(kind).or_default().push(DimensionRow {
            id,
            key: key.to_string(),
        });
        Ok(id)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.orders.push((id, order.clone()));
        Ok(id)
    }

    async fn insert_commission(&self, commission: &NewCommission) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.orders.iter().any(|(id, _)| *id == commission.order_id) {
            bail!("commission references unknown order id {}", commission.order_id);
        }
        let id = inner.next_id();
        inner.commissions.push((id, commission.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_returns_none_for_unknown_key() {
        let store = MemoryStore::new();
        let found = store
            .find_dimension(DimensionKind::Service, "S1")
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryStore::new();
        let id = store
            .insert_dimension(DimensionKind::Location, "221B Baker St")
            .await
            .unwrap();
        let found = store
            .find_dimension(DimensionKind::Location, "221B Baker St")
            .await
            .unwrap();
        assert_eq!(found, Some(id));
    }

    #[tokio::test]
    async fn test_whitespace_key_is_rejected() {
        let store = MemoryStore::new();
        assert!(
            store
                .insert_dimension(DimensionKind::Partner, "   ")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let store = MemoryStore::new();
        let a = store
            .insert_dimension(DimensionKind::Partner, "A")
            .await
            .unwrap();
        let b = store
            .insert_dimension(DimensionKind::Partner, "B")
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
