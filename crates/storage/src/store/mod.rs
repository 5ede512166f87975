#![forbid(unsafe_code)]

mod error;
mod executions;
mod procedures;
mod requests;
mod support;
mod types;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use pk_core::ids::TenantId;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tenant-scoped persistence gateway for procedures and executions.
///
/// Every statement carries a `tenant = ?` equality; cross-tenant reads are
/// possible only through the explicit `is_global` escape hatch on
/// procedures, never for executions.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join("prockit.db");
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        support::schema::install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub(in crate::store) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(in crate::store) fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }
}

pub(in crate::store) fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

pub(in crate::store) fn ensure_tenant_tx(
    tx: &Transaction<'_>,
    tenant: &TenantId,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO tenants(tenant, created_at_ms) VALUES (?1, ?2)",
        params![tenant.as_str(), now_ms],
    )?;
    Ok(())
}

pub(in crate::store) fn next_counter_tx(
    tx: &Transaction<'_>,
    tenant: &str,
    name: &str,
) -> Result<i64, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE tenant=?1 AND name=?2",
            params![tenant, name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    tx.execute(
        r#"
        INSERT INTO counters(tenant, name, value) VALUES (?1, ?2, ?3)
        ON CONFLICT(tenant, name) DO UPDATE SET value=excluded.value
        "#,
        params![tenant, name, next],
    )?;
    Ok(next)
}

pub(in crate::store) fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("value exceeds sqlite range"))
}
