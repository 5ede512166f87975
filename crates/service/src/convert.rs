#![forbid(unsafe_code)]

use crate::support::ts_ms_to_rfc3339;
use pk_storage::{ExecutionRow, FieldRow, ProcedureRecord, ProcedureRow};
use serde_json::{Value, json};

pub(crate) fn field_value(field: &FieldRow) -> Value {
    json!({
        "id": field.id,
        "procedureId": field.procedure_id,
        "label": field.label,
        "type": field.kind.type_tag(),
        "options": field.kind.options_value(),
        "required": field.required,
        "orderIndex": field.order_index,
        "createdAt": ts_ms_to_rfc3339(field.created_at_ms),
        "updatedAt": ts_ms_to_rfc3339(field.updated_at_ms),
    })
}

pub(crate) fn procedure_value(record: &ProcedureRecord) -> Value {
    let mut value = procedure_row_value(&record.procedure);
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "fields".to_string(),
            Value::Array(record.fields.iter().map(field_value).collect()),
        );
    }
    value
}

pub(crate) fn procedure_row_value(procedure: &ProcedureRow) -> Value {
    json!({
        "id": procedure.id,
        "title": procedure.title,
        "description": procedure.description,
        "category": procedure.category.as_str(),
        "tags": procedure.tags,
        "isGlobal": procedure.is_global,
        "executionsCount": procedure.executions_count,
        "createdAt": ts_ms_to_rfc3339(procedure.created_at_ms),
        "updatedAt": ts_ms_to_rfc3339(procedure.updated_at_ms),
    })
}

pub(crate) fn execution_value(execution: &ExecutionRow) -> Value {
    json!({
        "id": execution.id,
        "procedureId": execution.procedure_id,
        "workOrderId": execution.work_order_id,
        "userId": execution.user_id,
        "answers": execution.answers.to_value(),
        "score": execution.score,
        "status": execution.status.as_str(),
        "startedAt": ts_ms_to_rfc3339(execution.started_at_ms),
        "completedAt": execution.completed_at_ms.map(ts_ms_to_rfc3339),
    })
}
