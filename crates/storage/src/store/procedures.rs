#![forbid(unsafe_code)]

use super::{
    FieldInput, FieldRow, ListProceduresRequest, ProcedureCreateRequest, ProcedureRecord,
    ProcedureRow, ProcedureUpdateRequest, SqliteStore, StoreError, ensure_tenant_tx,
    next_counter_tx, now_ms, to_sqlite_i64,
};
use pk_core::fields::FieldKind;
use pk_core::ids::TenantId;
use pk_core::model::ProcedureCategory;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::BTreeSet;

impl SqliteStore {
    /// Creates a procedure and its fields as one unit: either everything is
    /// persisted or nothing is.
    pub fn procedure_create(
        &mut self,
        tenant: &TenantId,
        request: ProcedureCreateRequest,
    ) -> Result<ProcedureRecord, StoreError> {
        let title = normalize_title(request.title)?;
        let tags_json = encode_tags(&request.tags)?;
        check_field_ids(&request.fields)?;

        let now_ms = now_ms();
        let tx = self.transaction()?;
        ensure_tenant_tx(&tx, tenant, now_ms)?;

        let seq = next_counter_tx(&tx, tenant.as_str(), "procedure_seq")?;
        let id = format!("PROC-{seq:03}");

        tx.execute(
            r#"
            INSERT INTO procedures(tenant,id,title,description,category,tags_json,is_global,created_at_ms,updated_at_ms)
            VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)
            "#,
            params![
                tenant.as_str(),
                id,
                title,
                request.description,
                request.category.as_str(),
                tags_json,
                request.is_global,
                now_ms,
                now_ms
            ],
        )?;

        insert_fields_tx(&tx, tenant, &id, &request.fields, now_ms)?;

        let record = fetch_record(&tx, tenant, &id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(record)
    }

    /// Reads a procedure visible to the tenant: its own, or a global one.
    /// Fields come back ordered by `order_index`; `executions_count` counts
    /// the calling tenant's executions.
    pub fn procedure_get(
        &self,
        tenant: &TenantId,
        id: &str,
    ) -> Result<Option<ProcedureRecord>, StoreError> {
        fetch_record(self.conn(), tenant, id)
    }

    pub fn procedure_list(
        &self,
        tenant: &TenantId,
        request: ListProceduresRequest,
    ) -> Result<Vec<ProcedureRow>, StoreError> {
        let limit = to_sqlite_i64(request.limit)?;
        let offset = to_sqlite_i64(request.offset)?;

        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, tenant, title, description, category, tags_json, is_global, created_at_ms, updated_at_ms
            FROM procedures
            WHERE tenant = ?1 OR is_global = 1
            ORDER BY id ASC, tenant ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let rows = stmt.query_map(params![tenant.as_str(), limit, offset], read_procedure_row)?;
        let mut out = Vec::new();
        for row in rows {
            let mut procedure = decode_procedure_row(row?)?;
            procedure.executions_count =
                count_executions(self.conn(), tenant, &procedure.id)?;
            out.push(procedure);
        }
        Ok(out)
    }

    /// Applies scalar patches; a present `fields` replaces the entire field
    /// set (delete-then-insert) with `order_index` taken from array position.
    /// Only the owning tenant may update; global procedures are read-only to
    /// everyone else.
    pub fn procedure_update(
        &mut self,
        tenant: &TenantId,
        id: &str,
        request: ProcedureUpdateRequest,
    ) -> Result<ProcedureRecord, StoreError> {
        if request.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        if let Some(fields) = request.fields.as_deref() {
            check_field_ids(fields)?;
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let current = tx
            .query_row(
                r#"
                SELECT title, description, category, tags_json, is_global
                FROM procedures
                WHERE tenant = ?1 AND id = ?2
                "#,
                params![tenant.as_str(), id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((current_title, current_description, current_category, current_tags, current_global)) =
            current
        else {
            return Err(StoreError::UnknownId);
        };

        let title = match request.title {
            Some(title) => normalize_title(title)?,
            None => current_title,
        };
        let description = request.description.unwrap_or(current_description);
        let category = request
            .category
            .map(|category| category.as_str().to_string())
            .unwrap_or(current_category);
        let tags_json = match request.tags {
            Some(tags) => encode_tags(&tags)?,
            None => current_tags,
        };
        let is_global = request.is_global.unwrap_or(current_global);

        tx.execute(
            r#"
            UPDATE procedures
            SET title=?3, description=?4, category=?5, tags_json=?6, is_global=?7, updated_at_ms=?8
            WHERE tenant=?1 AND id=?2
            "#,
            params![
                tenant.as_str(),
                id,
                title,
                description,
                category,
                tags_json,
                is_global,
                now_ms
            ],
        )?;

        if let Some(fields) = request.fields {
            tx.execute(
                "DELETE FROM procedure_fields WHERE tenant=?1 AND procedure_id=?2",
                params![tenant.as_str(), id],
            )?;
            insert_fields_tx(&tx, tenant, id, &fields, now_ms)?;
        }

        let record = fetch_record(&tx, tenant, id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(record)
    }

    /// Deletes the procedure together with its fields and executions.
    pub fn procedure_delete(&mut self, tenant: &TenantId, id: &str) -> Result<bool, StoreError> {
        let tx = self.transaction()?;
        tx.execute(
            "DELETE FROM executions WHERE tenant=?1 AND procedure_id=?2",
            params![tenant.as_str(), id],
        )?;
        tx.execute(
            "DELETE FROM procedure_fields WHERE tenant=?1 AND procedure_id=?2",
            params![tenant.as_str(), id],
        )?;
        let deleted = tx.execute(
            "DELETE FROM procedures WHERE tenant=?1 AND id=?2",
            params![tenant.as_str(), id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Copies a visible procedure into the calling tenant with fresh field
    /// ids. The copy is never global, whatever the source was.
    pub fn procedure_duplicate(
        &mut self,
        tenant: &TenantId,
        id: &str,
        new_title: Option<String>,
    ) -> Result<ProcedureRecord, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let Some(source) = fetch_record(&tx, tenant, id)? else {
            return Err(StoreError::UnknownId);
        };

        let title = match new_title {
            Some(title) => normalize_title(title)?,
            None => format!("{} (Copy)", source.procedure.title),
        };

        ensure_tenant_tx(&tx, tenant, now_ms)?;
        let seq = next_counter_tx(&tx, tenant.as_str(), "procedure_seq")?;
        let copy_id = format!("PROC-{seq:03}");

        tx.execute(
            r#"
            INSERT INTO procedures(tenant,id,title,description,category,tags_json,is_global,created_at_ms,updated_at_ms)
            VALUES (?1,?2,?3,?4,?5,?6,0,?7,?8)
            "#,
            params![
                tenant.as_str(),
                copy_id,
                title,
                source.procedure.description,
                source.procedure.category.as_str(),
                encode_tags(&source.procedure.tags)?,
                now_ms,
                now_ms
            ],
        )?;

        let fields: Vec<FieldInput> = source
            .fields
            .iter()
            .map(|field| FieldInput {
                id: None,
                label: field.label.clone(),
                kind: field.kind.clone(),
                required: field.required,
            })
            .collect();
        insert_fields_tx(&tx, tenant, &copy_id, &fields, now_ms)?;

        let record = fetch_record(&tx, tenant, &copy_id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(record)
    }
}

fn normalize_title(title: String) -> Result<String, StoreError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(StoreError::InvalidInput("title must not be empty"));
    }
    if title.len() > 500 {
        return Err(StoreError::InvalidInput("title is too long"));
    }
    Ok(title)
}

fn check_field_ids(fields: &[FieldInput]) -> Result<(), StoreError> {
    let mut seen = BTreeSet::new();
    for field in fields {
        if field.label.trim().is_empty() {
            return Err(StoreError::InvalidInput("field label must not be empty"));
        }
        if let Some(id) = field.id.as_deref() {
            if id.trim().is_empty() {
                return Err(StoreError::InvalidInput("field id must not be empty"));
            }
            if !seen.insert(id) {
                return Err(StoreError::InvalidInput("duplicate field id"));
            }
        }
    }
    Ok(())
}

fn encode_tags(tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(|err| StoreError::PayloadDecode {
        id: "tags".to_string(),
        message: err.to_string(),
    })
}

fn decode_tags(procedure_id: &str, tags_json: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(tags_json).map_err(|err| StoreError::PayloadDecode {
        id: procedure_id.to_string(),
        message: err.to_string(),
    })
}

/// Inserts the given fields with `order_index` equal to array position,
/// minting ids from the tenant counter where the caller supplied none.
fn insert_fields_tx(
    tx: &Transaction<'_>,
    tenant: &TenantId,
    procedure_id: &str,
    fields: &[FieldInput],
    now_ms: i64,
) -> Result<(), StoreError> {
    for (index, field) in fields.iter().enumerate() {
        let id = match field.id.as_deref() {
            Some(id) => id.trim().to_string(),
            None => {
                let seq = next_counter_tx(tx, tenant.as_str(), "field_seq")?;
                format!("FLD-{seq:04}")
            }
        };
        let options_json = serde_json::to_string(&field.kind.options_value()).map_err(|err| {
            StoreError::PayloadDecode {
                id: id.clone(),
                message: err.to_string(),
            }
        })?;
        let required = field.required && field.kind.is_input();
        tx.execute(
            r#"
            INSERT INTO procedure_fields(tenant,id,procedure_id,label,field_type,options_json,required,order_index,created_at_ms,updated_at_ms)
            VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
            "#,
            params![
                tenant.as_str(),
                id,
                procedure_id,
                field.label.trim(),
                field.kind.type_tag(),
                options_json,
                required,
                to_sqlite_i64(index)?,
                now_ms,
                now_ms
            ],
        )?;
    }
    Ok(())
}

type RawProcedureRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    bool,
    i64,
    i64,
);

fn read_procedure_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProcedureRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn decode_procedure_row(raw: RawProcedureRow) -> Result<ProcedureRow, StoreError> {
    let (id, tenant, title, description, category, tags_json, is_global, created_at_ms, updated_at_ms) =
        raw;
    let tags = decode_tags(&id, &tags_json)?;
    Ok(ProcedureRow {
        category: ProcedureCategory::parse(&category).unwrap_or(ProcedureCategory::Other),
        tags,
        id,
        tenant,
        title,
        description,
        is_global,
        executions_count: 0,
        created_at_ms,
        updated_at_ms,
    })
}

pub(in crate::store) fn count_executions(
    conn: &Connection,
    tenant: &TenantId,
    procedure_id: &str,
) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM executions WHERE tenant=?1 AND procedure_id=?2",
        params![tenant.as_str(), procedure_id],
        |row| row.get(0),
    )?)
}

/// Resolves a procedure visible to the tenant, preferring its own over a
/// same-id global one from another tenant.
pub(in crate::store) fn fetch_record(
    conn: &Connection,
    tenant: &TenantId,
    id: &str,
) -> Result<Option<ProcedureRecord>, StoreError> {
    let raw = conn
        .query_row(
            r#"
            SELECT id, tenant, title, description, category, tags_json, is_global, created_at_ms, updated_at_ms
            FROM procedures
            WHERE id = ?2 AND (tenant = ?1 OR is_global = 1)
            ORDER BY CASE WHEN tenant = ?1 THEN 0 ELSE 1 END
            LIMIT 1
            "#,
            params![tenant.as_str(), id],
            read_procedure_row,
        )
        .optional()?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut procedure = decode_procedure_row(raw)?;
    procedure.executions_count = count_executions(conn, tenant, &procedure.id)?;

    // Fields live under the owning tenant, which differs from the caller
    // for global procedures.
    let owner = procedure.tenant.clone();
    let mut stmt = conn.prepare(
        r#"
        SELECT id, procedure_id, label, field_type, options_json, required, order_index, created_at_ms, updated_at_ms
        FROM procedure_fields
        WHERE tenant = ?1 AND procedure_id = ?2
        ORDER BY order_index ASC
        "#,
    )?;
    let rows = stmt.query_map(params![owner, procedure.id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, bool>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, i64>(7)?,
            row.get::<_, i64>(8)?,
        ))
    })?;

    let mut fields = Vec::new();
    for row in rows {
        let (id, procedure_id, label, field_type, options_json, required, order_index, created_at_ms, updated_at_ms) =
            row?;
        let options =
            serde_json::from_str(&options_json).map_err(|err| StoreError::PayloadDecode {
                id: id.clone(),
                message: err.to_string(),
            })?;
        let kind = FieldKind::from_parts(&field_type, options).map_err(|err| {
            StoreError::PayloadDecode {
                id: id.clone(),
                message: err.to_string(),
            }
        })?;
        fields.push(FieldRow {
            id,
            procedure_id,
            label,
            kind,
            required,
            order_index,
            created_at_ms,
            updated_at_ms,
        });
    }

    Ok(Some(ProcedureRecord { procedure, fields }))
}
