//! SQLite-backed store via sqlx
//!
//! The schema is bootstrapped on open with `CREATE TABLE IF NOT EXISTS`.
//! Natural-key columns are checked non-empty but deliberately carry no
//! unique constraint: dimension deduplication happens through the
//! pipeline's lookup-or-create, and concurrent writers racing on the same
//! new key can produce duplicate rows.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::pipeline::DimensionKind;

use super::{NewCommission, NewOrder, Store};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS partners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
);

CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL CHECK (length(trim(address)) > 0)
);

CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
);

CREATE TABLE IF NOT EXISTS providers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
);

CREATE TABLE IF NOT EXISTS services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES customers(id),
    service_id INTEGER NOT NULL REFERENCES services(id),
    provider_id INTEGER NOT NULL REFERENCES providers(id),
    location_id INTEGER NOT NULL REFERENCES locations(id),
    mrc REAL
);

CREATE TABLE IF NOT EXISTS commissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_id INTEGER NOT NULL REFERENCES services(id),
    provider_id INTEGER NOT NULL REFERENCES providers(id),
    partner_id INTEGER NOT NULL REFERENCES partners(id),
    location_id INTEGER NOT NULL REFERENCES locations(id),
    order_id INTEGER NOT NULL REFERENCES orders(id),
    pct REAL
);
"#;

/// Store backed by a SQLite database
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a database file (creating it if needed) and ensure the schema
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        log::debug!("Opened database {}", path.display());
        Self::with_pool(pool).await
    }

    /// Open an in-memory database (dry runs against real SQL, tests)
    pub async fn open_in_memory() -> Result<Self> {
        // a single long-lived connection, or the database vanishes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to initialize schema")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_dimension(&self, kind: DimensionKind, key: &str) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = ? LIMIT 1",
            kind.table(),
            kind.key_column()
        );

        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to query {}", kind.table()))?;

        match row {
            Some(row) => Ok(Some(row.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn insert_dimension(&self, kind: DimensionKind, key: &str) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?)",
            kind.table(),
            kind.key_column()
        );

        let result = sqlx::query(&sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert into {}", kind.table()))?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, service_id, provider_id, location_id, mrc)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.customer_id)
        .bind(order.service_id)
        .bind(order.provider_id)
        .bind(order.location_id)
        .bind(order.mrc)
        .execute(&self.pool)
        .await
        .context("Failed to insert order")?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_commission(&self, commission: &NewCommission) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO commissions (service_id, provider_id, partner_id, location_id, order_id, pct)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(commission.service_id)
        .bind(commission.provider_id)
        .bind(commission.partner_id)
        .bind(commission.location_id)
        .bind(commission.order_id)
        .bind(commission.pct)
        .execute(&self.pool)
        .await
        .context("Failed to insert commission")?;

        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dimension_roundtrip() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let found = store
            .find_dimension(DimensionKind::Partner, "Acme")
            .await
            .unwrap();
        assert_eq!(found, None);

        let id = store
            .insert_dimension(DimensionKind::Partner, "Acme")
            .await
            .unwrap();

        let found = store
            .find_dimension(DimensionKind::Partner, "Acme")
            .await
            .unwrap();
        assert_eq!(found, Some(id));
    }

    #[tokio::test]
    async fn test_empty_natural_key_is_rejected() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let result = store.insert_dimension(DimensionKind::Provider, "").await;
        assert!(result.is_err());

        let result = store.insert_dimension(DimensionKind::Provider, "  ").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_location_uses_address_column() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let id = store
            .insert_dimension(DimensionKind::Location, "10 Main St")
            .await
            .unwrap();
        let found = store
            .find_dimension(DimensionKind::Location, "10 Main St")
            .await
            .unwrap();
        assert_eq!(found, Some(id));
    }

    #[tokio::test]
    async fn test_order_and_commission_insert() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let customer_id = store
            .insert_dimension(DimensionKind::Customer, "C1")
            .await
            .unwrap();
        let service_id = store
            .insert_dimension(DimensionKind::Service, "S1")
            .await
            .unwrap();
        let provider_id = store
            .insert_dimension(DimensionKind::Provider, "P1")
            .await
            .unwrap();
        let location_id = store
            .insert_dimension(DimensionKind::Location, "L1")
            .await
            .unwrap();
        let partner_id = store
            .insert_dimension(DimensionKind::Partner, "A")
            .await
            .unwrap();

        let order_id = store
            .insert_order(&NewOrder {
                customer_id,
                service_id,
                provider_id,
                location_id,
                mrc: 100.0,
            })
            .await
            .unwrap();

        let commission_id = store
            .insert_commission(&NewCommission {
                service_id,
                provider_id,
                partner_id,
                location_id,
                order_id,
                pct: 5.0,
            })
            .await
            .unwrap();

        assert!(order_id > 0);
        assert!(commission_id > 0);
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_not_rejected_by_the_schema() {
        // dedup is the resolver's job; the schema accepts duplicates, which
        // is what makes the cross-process race possible
        let store = SqliteStore::open_in_memory().await.unwrap();

        let a = store
            .insert_dimension(DimensionKind::Partner, "Acme")
            .await
            .unwrap();
        let b = store
            .insert_dimension(DimensionKind::Partner, "Acme")
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_batch_end_to_end() {
        use crate::ingest::{CellValue, SourceRow, columns};
        use crate::pipeline::process_batch;

        let store = SqliteStore::open_in_memory().await.unwrap();

        let mut rows = Vec::new();
        for (customer, mrc, pct) in [("C1", 100, 5), ("C2", 200, 10)] {
            let mut row = SourceRow::new();
            row.insert(columns::PARTNER, CellValue::Text("A".into()));
            row.insert(columns::LOCATION, CellValue::Text("L1".into()));
            row.insert(columns::CUSTOMER, CellValue::Text(customer.into()));
            row.insert(columns::PROVIDER, CellValue::Text("P1".into()));
            row.insert(columns::SERVICE, CellValue::Text("S1".into()));
            row.insert(columns::MRC, CellValue::Int(mrc));
            row.insert(columns::PCT, CellValue::Int(pct));
            rows.push(row);
        }

        let report = process_batch(&store, &rows).await;

        assert_eq!(report.partners, 1);
        assert_eq!(report.locations, 1);
        assert_eq!(report.customers, 2);
        assert_eq!(report.providers, 1);
        assert_eq!(report.services, 1);
        assert_eq!(report.orders, 2);
        assert_eq!(report.commissions, 2);
        assert!(report.errors.is_empty());
    }
}
