#![forbid(unsafe_code)]

use crate::FormService;
use crate::convert::{procedure_row_value, procedure_value};
use crate::support::{
    error, ok, optional_bool, optional_clearable_string, optional_string, optional_string_array,
    page_args, require_object, require_string,
};
use pk_core::fields::FieldKind;
use pk_core::model::ProcedureCategory;
use pk_storage::{
    FieldInput, ListProceduresRequest, ProcedureCreateRequest, ProcedureUpdateRequest,
};
use serde_json::{Map, Value, json};

impl FormService {
    pub(crate) fn cmd_procedure_create(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let title = match require_string(args_obj, "title") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let description = match optional_string(args_obj, "description") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let category = match parse_category(args_obj) {
            Ok(v) => v.unwrap_or(ProcedureCategory::Other),
            Err(resp) => return resp,
        };
        let tags = match optional_string_array(args_obj, "tags") {
            Ok(v) => v.unwrap_or_default(),
            Err(resp) => return resp,
        };
        let is_global = match optional_bool(args_obj, "isGlobal") {
            Ok(v) => v.unwrap_or(false),
            Err(resp) => return resp,
        };
        let fields = match parse_field_inputs(args_obj.get("fields")) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.procedure_create(
            session.tenant(),
            ProcedureCreateRequest {
                title,
                description,
                category,
                tags,
                is_global,
                fields,
            },
        ) {
            Ok(record) => ok(
                "procedure_create",
                json!({"procedure": procedure_value(&record)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_procedure_get(&mut self, args: Value) -> Value {
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

        match self.store.procedure_get(session.tenant(), &id) {
            Ok(Some(record)) => ok(
                "procedure_get",
                json!({"procedure": procedure_value(&record)}),
            ),
            Ok(None) => error("NOT_FOUND", "no such procedure in this tenant"),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_procedure_list(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let session = match self.require_session() {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let (limit, offset) = match page_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self
            .store
            .procedure_list(session.tenant(), ListProceduresRequest { limit, offset })
        {
            Ok(rows) => ok(
                "procedure_list",
                json!({
                    "procedures": rows.iter().map(procedure_row_value).collect::<Vec<_>>(),
                    "count": rows.len(),
                }),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_procedure_update(&mut self, args: Value) -> Value {
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
        let title = match optional_string(args_obj, "title") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let description = match optional_clearable_string(args_obj, "description") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let category = match parse_category(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let tags = match optional_string_array(args_obj, "tags") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let is_global = match optional_bool(args_obj, "isGlobal") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let fields = match args_obj.get("fields") {
            None | Some(Value::Null) => None,
            present => match parse_field_inputs(present) {
                Ok(v) => Some(v),
                Err(resp) => return resp,
            },
        };

        match self.store.procedure_update(
            session.tenant(),
            &id,
            ProcedureUpdateRequest {
                title,
                description,
                category,
                tags,
                is_global,
                fields,
            },
        ) {
            Ok(record) => ok(
                "procedure_update",
                json!({"procedure": procedure_value(&record)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_procedure_delete(&mut self, args: Value) -> Value {
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

        match self.store.procedure_delete(session.tenant(), &id) {
            Ok(true) => ok("procedure_delete", json!({"deleted": true})),
            Ok(false) => error("NOT_FOUND", "no such procedure in this tenant"),
            Err(err) => self.store_failure(err),
        }
    }

    pub(crate) fn cmd_procedure_duplicate(&mut self, args: Value) -> Value {
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
        let new_title = match optional_string(args_obj, "newTitle") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self
            .store
            .procedure_duplicate(session.tenant(), &id, new_title)
        {
            Ok(record) => ok(
                "procedure_duplicate",
                json!({"procedure": procedure_value(&record)}),
            ),
            Err(err) => self.store_failure(err),
        }
    }
}

fn parse_category(args: &Map<String, Value>) -> Result<Option<ProcedureCategory>, Value> {
    let Some(raw) = optional_string(args, "category")? else {
        return Ok(None);
    };
    match ProcedureCategory::parse(&raw) {
        Some(category) => Ok(Some(category)),
        None => Err(error(
            "INVALID_INPUT",
            &format!("unknown category \"{raw}\""),
        )),
    }
}

/// Parses the `fields` argument into gateway inputs. Option payloads are
/// checked here: a malformed payload is a validation refusal, not a store
/// failure later.
pub(in crate::handlers) fn parse_field_inputs(
    value: Option<&Value>,
) -> Result<Vec<FieldInput>, Value> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(error("INVALID_INPUT", "fields must be an array")),
    };

    let mut fields = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(error("INVALID_INPUT", "each field must be an object"));
        };
        let id = optional_string(object, "id")?;
        let label = match object.get("label").and_then(|v| v.as_str()) {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => {
                return Err(error(
                    "INVALID_INPUT",
                    &format!("fields[{index}] needs a non-empty label"),
                ));
            }
        };
        let Some(type_tag) = object.get("type").and_then(|v| v.as_str()) else {
            return Err(error(
                "INVALID_INPUT",
                &format!("fields[{index}] needs a type"),
            ));
        };
        let options = object.get("options").cloned().unwrap_or(Value::Null);
        let kind = match FieldKind::from_parts(type_tag, options) {
            Ok(kind) => kind,
            Err(err) => return Err(error("VALIDATION", &err.to_string())),
        };
        let required = object.get("required").and_then(|v| v.as_bool()).unwrap_or(false);
        fields.push(FieldInput {
            id,
            label,
            kind,
            required,
        });
    }
    Ok(fields)
}
