#![forbid(unsafe_code)]

use crate::FormService;
use crate::convert::execution_value;
use crate::support::{
    error, ok, optional_f64, optional_string, page_args, require_object, require_string,
    validation_error,
};
use pk_core::fields::Answers;
use pk_forms::validate_answers;
use pk_storage::{
    ExecutionCancelRequest, ExecutionStartRequest, ExecutionSubmitRequest, ListExecutionsRequest,
};
use serde_json::{Map, Value, json};

impl FormService {
    pub(crate) fn cmd_execution_start(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let procedure_id = match require_string(args_obj, "procedureId") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let work_order_id = match optional_string(args_obj, "workOrderId") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let user_id = match optional_string(args_obj, "userId") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let user_id = user_id.or_else(|| session.user_id().map(str::to_string));

        match self.store.execution_start(
            session.tenant(),
            ExecutionStartRequest {
                procedure_id,
                work_order_id,
                user_id,
            },
        ) {
            Ok(execution) => ok(
                "execution_start",
                json!({"execution": execution_value(&execution)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    /// Validates the answer-set against the procedure's fields before
    /// submitting; this is the layer that refuses incomplete or malformed
    /// answers, the gateway itself records whatever it is told.
    pub(crate) fn cmd_execution_submit(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let execution_id = match require_string(args_obj, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let answers = match decode_answers(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let score = match optional_f64(args_obj, "score") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let execution = match self.store.execution_get(session.tenant(), &execution_id) {
            Ok(Some(execution)) => execution,
            Ok(None) => return error("NOT_FOUND", "no such execution in this tenant"),
            Err(err) => return self.store_failure(err),
        };
        match self
            .store
            .procedure_get(session.tenant(), &execution.procedure_id)
        {
            Ok(Some(record)) => {
                let issues = validate_answers(&record.field_list(), &answers);
                if !issues.is_empty() {
                    return validation_error(&issues);
                }
            }
            // The procedure can be gone only if it was deleted mid-run;
            // nothing left to validate against, record the run as-is.
            Ok(None) => {}
            Err(err) => return self.store_failure(err),
        }

        match self.store.execution_submit(
            session.tenant(),
            ExecutionSubmitRequest {
                execution_id,
                answers,
                score,
            },
        ) {
            Ok(execution) => ok(
                "execution_submit",
                json!({"execution": execution_value(&execution)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_execution_cancel(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let execution_id = match require_string(args_obj, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self
            .store
            .execution_cancel(session.tenant(), ExecutionCancelRequest { execution_id })
        {
            Ok(execution) => ok(
                "execution_cancel",
                json!({"execution": execution_value(&execution)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_execution_get(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let id = match require_string(args_obj, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.execution_get(session.tenant(), &id) {
            Ok(Some(execution)) => ok(
                "execution_get",
                json!({"execution": execution_value(&execution)}),
            ),
            Ok(None) => error("NOT_FOUND", "no such execution in this tenant"),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_execution_list(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let procedure_id = match optional_string(args_obj, "procedureId") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let work_order_id = match optional_string(args_obj, "workOrderId") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let (limit, offset) = match page_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.execution_list(
            session.tenant(),
            ListExecutionsRequest {
                procedure_id,
                work_order_id,
                limit,
                offset,
            },
        ) {
            Ok(rows) => ok(
                "execution_list",
                json!({
                    "executions": rows.iter().map(execution_value).collect::<Vec<_>>(),
                    "count": rows.len(),
                }),
            ),
            Err(err) => self.store_failure(err),
        }
    }
}

pub(in crate::handlers) fn decode_answers(args: &Map<String, Value>) -> Result<Answers, Value> {
    match args.get("answers") {
        None | Some(Value::Null) => Ok(Answers::new()),
        Some(value) => {
            Answers::from_value(value).map_err(|err| error("VALIDATION", &err.to_string()))
        }
    }
}
