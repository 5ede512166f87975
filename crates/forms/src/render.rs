#![forbid(unsafe_code)]

//! Maps a field and its current value to the widget that displays it.
//!
//! Dispatch is one exhaustive match over [`FieldKind`]; the unknown-kind
//! fallback is the `Unknown` arm, which degrades to a plain text control
//! with a visible warning instead of failing. Rendering never persists
//! anything; the output is a pure description of the control.

use pk_core::fields::{AnswerValue, FieldDef, FieldKind, FieldList};
use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Edit,
    ReadOnly,
}

/// A widget description the UI layer can draw without knowing field kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedControl {
    pub field_id: String,
    pub widget: &'static str,
    pub label: String,
    pub required: bool,
    pub read_only: bool,
    pub value: Value,
    pub props: Value,
    pub warnings: Vec<String>,
}

impl RenderedControl {
    pub fn to_value(&self) -> Value {
        json!({
            "fieldId": self.field_id,
            "widget": self.widget,
            "label": self.label,
            "required": self.required,
            "readOnly": self.read_only,
            "value": self.value,
            "props": self.props,
            "warnings": self.warnings,
        })
    }
}

pub fn render_form(
    fields: &FieldList,
    answers: impl Fn(&str) -> Option<AnswerValue>,
    mode: RenderMode,
) -> Vec<RenderedControl> {
    fields
        .iter()
        .map(|field| render_field(field, answers(&field.id).as_ref(), mode))
        .collect()
}

pub fn render_field(
    field: &FieldDef,
    value: Option<&AnswerValue>,
    mode: RenderMode,
) -> RenderedControl {
    let mut warnings = Vec::new();
    let current = value.map(AnswerValue::to_value).unwrap_or(Value::Null);

    let (widget, props, value) = match &field.kind {
        FieldKind::Text(opts) => ("text", text_props(opts), current),
        FieldKind::Textarea(opts) => ("textarea", text_props(opts), current),
        FieldKind::Email(opts) => ("email", text_props(opts), current),
        FieldKind::Url(opts) => ("url", text_props(opts), current),
        FieldKind::Phone(opts) => ("phone", text_props(opts), current),
        FieldKind::Number(opts) => (
            "number",
            json!({
                "minValue": opts.min_value,
                "maxValue": opts.max_value,
                "step": opts.step,
            }),
            current,
        ),
        FieldKind::Slider(opts) => {
            let min = opts.min_value.unwrap_or(0.0);
            let max = opts.max_value.unwrap_or(100.0);
            let current_number = value.and_then(|answer| match answer {
                AnswerValue::Number(number) => Some(*number),
                _ => None,
            });
            (
                "slider",
                json!({
                    "minValue": min,
                    "maxValue": max,
                    "step": opts.step,
                    "minLabel": format_number(min),
                    "maxLabel": format_number(max),
                    "currentLabel": current_number
                        .map(format_number)
                        .unwrap_or_else(|| "-".to_string()),
                }),
                current,
            )
        }
        FieldKind::Checkbox => ("checkbox", json!({}), current),
        FieldKind::Select(opts) => (
            "select_one",
            json!({"choices": opts.choices}),
            current,
        ),
        FieldKind::Radio(opts) => (
            "radio_group",
            json!({"choices": opts.choices}),
            current,
        ),
        FieldKind::Multiselect(opts) => (
            "select_many",
            json!({
                "choices": opts.choices,
                "allowOther": opts.allow_other,
            }),
            current,
        ),
        FieldKind::Date(opts) => (
            "date",
            json!({
                "minDate": opts.min_date,
                "maxDate": opts.max_date,
                "defaultToday": opts.default_today,
            }),
            current,
        ),
        FieldKind::Time(opts) => (
            "time",
            json!({
                "minDate": opts.min_date,
                "maxDate": opts.max_date,
            }),
            current,
        ),
        FieldKind::Datetime(opts) => (
            "datetime",
            json!({
                "minDate": opts.min_date,
                "maxDate": opts.max_date,
                "defaultToday": opts.default_today,
            }),
            current,
        ),
        FieldKind::File(opts) => (
            "file",
            json!({
                "multiple": opts.allow_multiple_files,
                "maxFileSize": opts.max_file_size,
                "accept": opts.allowed_types,
            }),
            current,
        ),
        FieldKind::Image(opts) => {
            // Image restricts to image MIME types unless configured otherwise.
            let accept = if opts.allowed_types.is_empty() {
                json!(["image/*"])
            } else {
                json!(opts.allowed_types)
            };
            (
                "image",
                json!({
                    "multiple": opts.allow_multiple_files,
                    "maxFileSize": opts.max_file_size,
                    "accept": accept,
                }),
                current,
            )
        }
        FieldKind::Rating(opts) => (
            "rating",
            json!({
                "maxRating": opts.max_rating,
                "allowHalfStars": opts.allow_half_stars,
            }),
            current,
        ),
        FieldKind::Section => ("section", json!({}), Value::Null),
        FieldKind::Divider => ("divider", json!({}), Value::Null),
        FieldKind::Info(opts) => ("info", json!({"infoText": opts.info_text}), Value::Null),
        FieldKind::Inspection(opts) => (
            "inspection",
            json!({
                "choices": ["pass", "fail", "flag"],
                "allowComments": opts.allow_comments,
                "requireCommentOnFail": opts.require_comment_on_fail,
            }),
            current,
        ),
        FieldKind::Unknown { raw_type, .. } => {
            warnings.push(format!("unknown field type \"{raw_type}\""));
            ("text", json!({}), current)
        }
    };

    RenderedControl {
        field_id: field.id.clone(),
        widget,
        label: field.label.clone(),
        required: field.required,
        read_only: mode == RenderMode::ReadOnly,
        value,
        props,
        warnings,
    }
}

fn text_props(opts: &pk_core::fields::TextOptions) -> Value {
    json!({
        "placeholder": opts.placeholder,
        "helpText": opts.help_text,
    })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::fields::{ChoiceOptions, NumberOptions, TextOptions};
    use serde_json::json;

    fn text_field(id: &str) -> FieldDef {
        FieldDef::new(id, "Name", FieldKind::Text(TextOptions::default())).required(true)
    }

    #[test]
    fn unknown_kind_renders_flagged_text_control() {
        let field = FieldDef::new(
            "FLD-9",
            "Signature",
            FieldKind::Unknown {
                raw_type: "signature".to_string(),
                options: json!({}),
            },
        );
        let control = render_field(&field, None, RenderMode::Edit);
        assert_eq!(control.widget, "text");
        assert_eq!(control.warnings.len(), 1);
        assert!(control.warnings[0].contains("signature"));
    }

    #[test]
    fn slider_renders_min_current_max_labels() {
        let field = FieldDef::new(
            "FLD-1",
            "Pressure",
            FieldKind::Slider(NumberOptions {
                min_value: Some(0.0),
                max_value: Some(10.0),
                step: Some(0.5),
            }),
        );
        let control = render_field(&field, Some(&AnswerValue::Number(7.5)), RenderMode::Edit);
        assert_eq!(control.props["minLabel"], "0");
        assert_eq!(control.props["maxLabel"], "10");
        assert_eq!(control.props["currentLabel"], "7.5");
    }

    #[test]
    fn presentation_kinds_never_carry_a_value() {
        let field = FieldDef::new("FLD-2", "Checks", FieldKind::Section);
        let control = render_field(
            &field,
            Some(&AnswerValue::Text("stray".to_string())),
            RenderMode::Edit,
        );
        assert_eq!(control.value, Value::Null);
    }

    #[test]
    fn select_carries_choices_and_read_only_mode() {
        let field = FieldDef::new(
            "FLD-3",
            "Guards",
            FieldKind::Select(ChoiceOptions {
                choices: vec!["Yes".to_string(), "No".to_string()],
                allow_other: false,
            }),
        );
        let control = render_field(
            &field,
            Some(&AnswerValue::Text("Yes".to_string())),
            RenderMode::ReadOnly,
        );
        assert_eq!(control.widget, "select_one");
        assert!(control.read_only);
        assert_eq!(control.props["choices"], json!(["Yes", "No"]));
        assert_eq!(control.value, json!("Yes"));
    }

    #[test]
    fn render_form_preserves_field_order() {
        let fields = FieldList::from_vec(vec![text_field("a"), text_field("b")]);
        let controls = render_form(&fields, |_| None, RenderMode::Edit);
        let ids: Vec<_> = controls.iter().map(|c| c.field_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
