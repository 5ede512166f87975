#![forbid(unsafe_code)]

use super::executions::decode_answers;
use crate::FormService;
use crate::support::{error, ok, optional_string, require_object, require_string};
use pk_core::fields::FieldKind;
use pk_forms::{RenderMode, options_editor, render_form};
use serde_json::{Value, json};

impl FormService {
    /// Renders a procedure's form: one control description per field, in
    /// field order, prefilled from the given answers.
    pub(crate) fn cmd_form_render(&mut self, args: Value) -> Value {
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
        let answers = match decode_answers(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let mode = match optional_string(args_obj, "mode") {
            Ok(None) => RenderMode::Edit,
            Ok(Some(raw)) => match raw.as_str() {
                "edit" => RenderMode::Edit,
                "read_only" => RenderMode::ReadOnly,
                _ => return error("INVALID_INPUT", "mode must be \"edit\" or \"read_only\""),
            },
            Err(resp) => return resp,
        };

        let record = match self.store.procedure_get(session.tenant(), &procedure_id) {
            Ok(Some(record)) => record,
            Ok(None) => return error("NOT_FOUND", "no such procedure in this tenant"),
            Err(err) => return self.store_failure(err),
        };

        let fields = record.field_list();
        let controls = render_form(&fields, |field_id| answers.get(field_id).cloned(), mode);
        ok(
            "form_render",
            json!({
                "procedureId": record.procedure.id,
                "controls": controls
                    .iter()
                    .map(|control| control.to_value())
                    .collect::<Vec<_>>(),
            }),
        )
    }

    /// The builder-side options editor for one field type.
    pub(crate) fn cmd_field_options_editor(&mut self, args: Value) -> Value {
        let args_obj = match require_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        if let Err(resp) = self.require_session() {
            return resp;
        }
        let type_tag = match require_string(args_obj, "type") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let options = args_obj.get("options").cloned().unwrap_or(Value::Null);

        let kind = match FieldKind::from_parts(&type_tag, options) {
            Ok(kind) => kind,
            Err(err) => return error("VALIDATION", &err.to_string()),
        };
        if !kind.is_known() {
            return error(
                "INVALID_INPUT",
                &format!("\"{type_tag}\" is not a configurable field type"),
            );
        }
        ok(
            "field_options_editor",
            json!({"editor": options_editor(&kind).to_value()}),
        )
    }
}
