#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{Connection, params};

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tenants (
          tenant TEXT PRIMARY KEY,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counters (
          tenant TEXT NOT NULL,
          name TEXT NOT NULL,
          value INTEGER NOT NULL,
          PRIMARY KEY (tenant, name)
        );

        CREATE TABLE IF NOT EXISTS procedures (
          tenant TEXT NOT NULL,
          id TEXT NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          category TEXT NOT NULL,
          tags_json TEXT NOT NULL,
          is_global INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          PRIMARY KEY (tenant, id)
        );

        CREATE TABLE IF NOT EXISTS procedure_fields (
          tenant TEXT NOT NULL,
          id TEXT NOT NULL,
          procedure_id TEXT NOT NULL,
          label TEXT NOT NULL,
          field_type TEXT NOT NULL,
          options_json TEXT NOT NULL,
          required INTEGER NOT NULL DEFAULT 0,
          order_index INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          PRIMARY KEY (tenant, id)
        );

        CREATE TABLE IF NOT EXISTS executions (
          tenant TEXT NOT NULL,
          id TEXT NOT NULL,
          procedure_id TEXT NOT NULL,
          work_order_id TEXT,
          user_id TEXT,
          answers_json TEXT NOT NULL,
          score REAL NOT NULL DEFAULT 0,
          status TEXT NOT NULL,
          started_at_ms INTEGER NOT NULL,
          completed_at_ms INTEGER,
          PRIMARY KEY (tenant, id)
        );

        CREATE INDEX IF NOT EXISTS idx_fields_by_procedure
          ON procedure_fields(tenant, procedure_id, order_index);
        CREATE INDEX IF NOT EXISTS idx_executions_by_procedure
          ON executions(tenant, procedure_id);
        CREATE INDEX IF NOT EXISTS idx_executions_by_work_order
          ON executions(tenant, work_order_id);
        CREATE INDEX IF NOT EXISTS idx_procedures_global
          ON procedures(is_global, id);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", "v1"],
    )?;
    Ok(())
}
