#![forbid(unsafe_code)]

//! Builder-side editors: for each field kind, the inputs that configure its
//! options. One small descriptor per kind, all cut from the same cloth.

use pk_core::fields::FieldKind;
use serde_json::{Value, json};

/// One input row in the options editor for a kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorInput {
    pub key: &'static str,
    pub label: &'static str,
    pub input: &'static str,
    pub value: Value,
}

impl EditorInput {
    fn new(key: &'static str, label: &'static str, input: &'static str, value: Value) -> Self {
        Self {
            key,
            label,
            input,
            value,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "key": self.key,
            "label": self.label,
            "input": self.input,
            "value": self.value,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionsEditor {
    pub type_tag: String,
    pub inputs: Vec<EditorInput>,
}

impl OptionsEditor {
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.type_tag,
            "inputs": self.inputs.iter().map(EditorInput::to_value).collect::<Vec<_>>(),
        })
    }
}

/// The options editor for a kind, prefilled with the kind's current options.
pub fn options_editor(kind: &FieldKind) -> OptionsEditor {
    let inputs = match kind {
        FieldKind::Text(opts)
        | FieldKind::Textarea(opts)
        | FieldKind::Email(opts)
        | FieldKind::Url(opts)
        | FieldKind::Phone(opts) => vec![
            EditorInput::new("placeholder", "Placeholder", "text", json!(opts.placeholder)),
            EditorInput::new("helpText", "Help text", "text", json!(opts.help_text)),
        ],
        FieldKind::Number(opts) | FieldKind::Slider(opts) => vec![
            EditorInput::new("minValue", "Minimum", "number", json!(opts.min_value)),
            EditorInput::new("maxValue", "Maximum", "number", json!(opts.max_value)),
            EditorInput::new("step", "Step", "number", json!(opts.step)),
        ],
        FieldKind::Select(opts) | FieldKind::Radio(opts) => vec![EditorInput::new(
            "choices",
            "Choices",
            "string_list",
            json!(opts.choices),
        )],
        FieldKind::Multiselect(opts) => vec![
            EditorInput::new("choices", "Choices", "string_list", json!(opts.choices)),
            EditorInput::new(
                "allowOther",
                "Allow a free-text \"Other\" entry",
                "toggle",
                json!(opts.allow_other),
            ),
        ],
        FieldKind::Date(opts) | FieldKind::Datetime(opts) => vec![
            EditorInput::new("minDate", "Earliest", "text", json!(opts.min_date)),
            EditorInput::new("maxDate", "Latest", "text", json!(opts.max_date)),
            EditorInput::new(
                "defaultToday",
                "Default to today",
                "toggle",
                json!(opts.default_today),
            ),
        ],
        FieldKind::Time(opts) => vec![
            EditorInput::new("minDate", "Earliest", "text", json!(opts.min_date)),
            EditorInput::new("maxDate", "Latest", "text", json!(opts.max_date)),
        ],
        FieldKind::File(opts) | FieldKind::Image(opts) => vec![
            EditorInput::new(
                "maxFileSize",
                "Maximum file size",
                "number",
                json!(opts.max_file_size),
            ),
            EditorInput::new(
                "allowMultipleFiles",
                "Allow multiple files",
                "toggle",
                json!(opts.allow_multiple_files),
            ),
            EditorInput::new(
                "allowedTypes",
                "Allowed types",
                "string_list",
                json!(opts.allowed_types),
            ),
        ],
        FieldKind::Rating(opts) => vec![
            EditorInput::new("maxRating", "Maximum rating", "number", json!(opts.max_rating)),
            EditorInput::new(
                "allowHalfStars",
                "Allow half stars",
                "toggle",
                json!(opts.allow_half_stars),
            ),
        ],
        FieldKind::Info(opts) => vec![EditorInput::new(
            "infoText",
            "Info text",
            "textarea",
            json!(opts.info_text),
        )],
        FieldKind::Inspection(opts) => vec![
            EditorInput::new(
                "allowComments",
                "Allow comments",
                "toggle",
                json!(opts.allow_comments),
            ),
            EditorInput::new(
                "requireCommentOnFail",
                "Require a comment on fail or flag",
                "toggle",
                json!(opts.require_comment_on_fail),
            ),
        ],
        FieldKind::Checkbox | FieldKind::Section | FieldKind::Divider => Vec::new(),
        FieldKind::Unknown { .. } => Vec::new(),
    };

    OptionsEditor {
        type_tag: kind.type_tag().to_string(),
        inputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::fields::{FieldKind, RatingOptions};
    use serde_json::json;

    #[test]
    fn rating_editor_prefills_current_options() {
        let editor = options_editor(&FieldKind::Rating(RatingOptions {
            max_rating: 10,
            allow_half_stars: true,
        }));
        assert_eq!(editor.type_tag, "rating");
        assert_eq!(editor.inputs[0].key, "maxRating");
        assert_eq!(editor.inputs[0].value, json!(10));
        assert_eq!(editor.inputs[1].value, json!(true));
    }

    #[test]
    fn kinds_without_options_get_empty_editors() {
        assert!(options_editor(&FieldKind::Divider).inputs.is_empty());
        assert!(options_editor(&FieldKind::Checkbox).inputs.is_empty());
    }

    #[test]
    fn every_known_kind_has_a_distinct_tag() {
        use pk_core::fields::*;
        let kinds = vec![
            FieldKind::Text(TextOptions::default()),
            FieldKind::Textarea(TextOptions::default()),
            FieldKind::Number(NumberOptions::default()),
            FieldKind::Email(TextOptions::default()),
            FieldKind::Url(TextOptions::default()),
            FieldKind::Phone(TextOptions::default()),
            FieldKind::Checkbox,
            FieldKind::Select(ChoiceOptions::default()),
            FieldKind::Multiselect(ChoiceOptions::default()),
            FieldKind::Radio(ChoiceOptions::default()),
            FieldKind::Date(DateOptions::default()),
            FieldKind::Time(DateOptions::default()),
            FieldKind::Datetime(DateOptions::default()),
            FieldKind::File(FileOptions::default()),
            FieldKind::Image(FileOptions::default()),
            FieldKind::Rating(RatingOptions::default()),
            FieldKind::Slider(NumberOptions::default()),
            FieldKind::Section,
            FieldKind::Divider,
            FieldKind::Info(InfoOptions::default()),
            FieldKind::Inspection(InspectionOptions::default()),
        ];
        let mut tags: Vec<_> = kinds.iter().map(|kind| kind.type_tag()).collect();
        tags.sort_unstable();
        let before = tags.len();
        tags.dedup();
        assert_eq!(tags.len(), before);
    }
}
