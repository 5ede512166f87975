#![forbid(unsafe_code)]

use pk_forms::ValidationIssue;
use pk_storage::StoreError;
use serde_json::{Value, json};

pub(crate) fn ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "error": null
    })
}

pub(crate) fn error(code: &str, message: &str) -> Value {
    error_with(code, message, None)
}

pub(crate) fn error_with(code: &str, message: &str, recovery: Option<&str>) -> Value {
    let mut error_obj = serde_json::Map::new();
    error_obj.insert("code".to_string(), Value::String(code.to_string()));
    error_obj.insert(
        "message".to_string(),
        Value::String(message.trim().to_string()),
    );
    if let Some(recovery) = recovery {
        error_obj.insert(
            "recovery".to_string(),
            Value::String(recovery.trim().to_string()),
        );
    }
    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "error": Value::Object(error_obj)
    })
}

/// Validation refusals carry the full issue list so the UI can pin each
/// message to its field.
pub(crate) fn validation_error(issues: &[ValidationIssue]) -> Value {
    let issues: Vec<Value> = issues
        .iter()
        .map(|issue| {
            json!({
                "fieldId": issue.field_id,
                "code": issue.code,
                "message": issue.message,
            })
        })
        .collect();
    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "error": {
            "code": "VALIDATION",
            "message": "the submitted answers are not valid",
            "issues": issues,
        }
    })
}

pub(crate) fn format_store_error(err: &StoreError) -> String {
    match err {
        StoreError::Io(e) => format!("IO: {e}"),
        StoreError::Sql(e) => format!("SQL: {e}"),
        StoreError::InvalidInput(msg) => format!("Invalid input: {msg}"),
        StoreError::UnknownId => "Unknown id".to_string(),
        StoreError::ExecutionAlreadyTerminal {
            execution_id,
            status,
        } => format!("Execution already terminal: execution_id={execution_id} status={status}"),
        StoreError::PayloadDecode { id, message } => {
            format!("Payload decode failed: id={id} {message}")
        }
    }
}
