#![forbid(unsafe_code)]

use super::{
    ExecutionCancelRequest, ExecutionRow, ExecutionStartRequest, ExecutionSubmitRequest,
    ListExecutionsRequest, SqliteStore, StoreError, ensure_tenant_tx, next_counter_tx, now_ms,
    to_sqlite_i64,
};
use pk_core::fields::Answers;
use pk_core::ids::TenantId;
use pk_core::model::ExecutionStatus;
use rusqlite::{Connection, OptionalExtension, params};

impl SqliteStore {
    /// Starts a run of a visible procedure: status `in_progress`, empty
    /// answers, `started_at_ms` stamped.
    pub fn execution_start(
        &mut self,
        tenant: &TenantId,
        request: ExecutionStartRequest,
    ) -> Result<ExecutionRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let visible = tx
            .query_row(
                "SELECT 1 FROM procedures WHERE id = ?2 AND (tenant = ?1 OR is_global = 1)",
                params![tenant.as_str(), request.procedure_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !visible {
            return Err(StoreError::UnknownId);
        }

        ensure_tenant_tx(&tx, tenant, now_ms)?;
        let seq = next_counter_tx(&tx, tenant.as_str(), "execution_seq")?;
        let id = format!("EXEC-{seq:04}");

        tx.execute(
            r#"
            INSERT INTO executions(tenant,id,procedure_id,work_order_id,user_id,answers_json,score,status,started_at_ms,completed_at_ms)
            VALUES (?1,?2,?3,?4,?5,'{}',0,?6,?7,NULL)
            "#,
            params![
                tenant.as_str(),
                id,
                request.procedure_id,
                request.work_order_id,
                request.user_id,
                ExecutionStatus::InProgress.as_str(),
                now_ms
            ],
        )?;

        let row = fetch_execution(&tx, tenant, &id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(row)
    }

    /// `in_progress -> completed`. The answer-set is recorded as given; the
    /// service layer is the one that validates it first. Terminal executions
    /// are never re-entered.
    pub fn execution_submit(
        &mut self,
        tenant: &TenantId,
        request: ExecutionSubmitRequest,
    ) -> Result<ExecutionRow, StoreError> {
        let score = request.score.unwrap_or(0.0);
        if !score.is_finite() {
            return Err(StoreError::InvalidInput("score must be a finite number"));
        }
        let answers_json = encode_answers(&request.execution_id, &request.answers)?;

        let now_ms = now_ms();
        let tx = self.transaction()?;

        guard_in_progress(&tx, tenant, &request.execution_id)?;

        tx.execute(
            r#"
            UPDATE executions
            SET answers_json=?3, score=?4, status=?5, completed_at_ms=?6
            WHERE tenant=?1 AND id=?2
            "#,
            params![
                tenant.as_str(),
                request.execution_id,
                answers_json,
                score,
                ExecutionStatus::Completed.as_str(),
                now_ms
            ],
        )?;

        let row = fetch_execution(&tx, tenant, &request.execution_id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(row)
    }

    /// `in_progress -> cancelled`; answers and score stay as they were.
    pub fn execution_cancel(
        &mut self,
        tenant: &TenantId,
        request: ExecutionCancelRequest,
    ) -> Result<ExecutionRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        guard_in_progress(&tx, tenant, &request.execution_id)?;

        tx.execute(
            r#"
            UPDATE executions
            SET status=?3, completed_at_ms=?4
            WHERE tenant=?1 AND id=?2
            "#,
            params![
                tenant.as_str(),
                request.execution_id,
                ExecutionStatus::Cancelled.as_str(),
                now_ms
            ],
        )?;

        let row = fetch_execution(&tx, tenant, &request.execution_id)?.ok_or(StoreError::UnknownId)?;
        tx.commit()?;
        Ok(row)
    }

    pub fn execution_get(
        &self,
        tenant: &TenantId,
        id: &str,
    ) -> Result<Option<ExecutionRow>, StoreError> {
        fetch_execution(self.conn(), tenant, id)
    }

    pub fn execution_list(
        &self,
        tenant: &TenantId,
        request: ListExecutionsRequest,
    ) -> Result<Vec<ExecutionRow>, StoreError> {
        let limit = to_sqlite_i64(request.limit)?;
        let offset = to_sqlite_i64(request.offset)?;

        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, tenant, procedure_id, work_order_id, user_id, answers_json, score, status, started_at_ms, completed_at_ms
            FROM executions
            WHERE tenant = ?1
              AND (?2 IS NULL OR procedure_id = ?2)
              AND (?3 IS NULL OR work_order_id = ?3)
            ORDER BY id ASC
            LIMIT ?4 OFFSET ?5
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                tenant.as_str(),
                request.procedure_id,
                request.work_order_id,
                limit,
                offset
            ],
            read_execution_raw,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode_execution_row(row?)?);
        }
        Ok(out)
    }
}

fn guard_in_progress(
    conn: &Connection,
    tenant: &TenantId,
    execution_id: &str,
) -> Result<(), StoreError> {
    let status: Option<String> = conn
        .query_row(
            "SELECT status FROM executions WHERE tenant=?1 AND id=?2",
            params![tenant.as_str(), execution_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(status) = status else {
        return Err(StoreError::UnknownId);
    };
    match ExecutionStatus::parse(&status) {
        Some(parsed) if parsed.is_terminal() => Err(StoreError::ExecutionAlreadyTerminal {
            execution_id: execution_id.to_string(),
            status,
        }),
        Some(_) => Ok(()),
        None => Err(StoreError::PayloadDecode {
            id: execution_id.to_string(),
            message: format!("unknown status {status}"),
        }),
    }
}

fn encode_answers(execution_id: &str, answers: &Answers) -> Result<String, StoreError> {
    serde_json::to_string(&answers.to_value()).map_err(|err| StoreError::PayloadDecode {
        id: execution_id.to_string(),
        message: err.to_string(),
    })
}

type RawExecutionRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    f64,
    String,
    i64,
    Option<i64>,
);

fn read_execution_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawExecutionRow> {
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
        row.get(9)?,
    ))
}

fn decode_execution_row(raw: RawExecutionRow) -> Result<ExecutionRow, StoreError> {
    let (id, tenant, procedure_id, work_order_id, user_id, answers_json, score, status, started_at_ms, completed_at_ms) =
        raw;
    let answers_value =
        serde_json::from_str(&answers_json).map_err(|err| StoreError::PayloadDecode {
            id: id.clone(),
            message: err.to_string(),
        })?;
    let answers = Answers::from_value(&answers_value).map_err(|err| StoreError::PayloadDecode {
        id: id.clone(),
        message: err.to_string(),
    })?;
    let status = ExecutionStatus::parse(&status).ok_or_else(|| StoreError::PayloadDecode {
        id: id.clone(),
        message: format!("unknown status {status}"),
    })?;
    Ok(ExecutionRow {
        id,
        tenant,
        procedure_id,
        work_order_id,
        user_id,
        answers,
        score,
        status,
        started_at_ms,
        completed_at_ms,
    })
}

fn fetch_execution(
    conn: &Connection,
    tenant: &TenantId,
    id: &str,
) -> Result<Option<ExecutionRow>, StoreError> {
    let raw = conn
        .query_row(
            r#"
            SELECT id, tenant, procedure_id, work_order_id, user_id, answers_json, score, status, started_at_ms, completed_at_ms
            FROM executions
            WHERE tenant = ?1 AND id = ?2
            "#,
            params![tenant.as_str(), id],
            read_execution_raw,
        )
        .optional()?;
    match raw {
        Some(raw) => Ok(Some(decode_execution_row(raw)?)),
        None => Ok(None),
    }
}
