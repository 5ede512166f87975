#![forbid(unsafe_code)]

use super::options::{
    ChoiceOptions, DateOptions, FileOptions, InfoOptions, InspectionOptions, NumberOptions,
    RatingOptions, TextOptions,
};
use serde_json::{Map, Value};

/// The canonical closed set of field kinds, each carrying its option payload.
///
/// Stored rows keep the pair `(type tag, options JSON)`; [`FieldKind::from_parts`]
/// decodes it and [`FieldKind::type_tag`] / [`FieldKind::options_value`] encode
/// it back, structure for structure. Tags this build does not recognize decode
/// into [`FieldKind::Unknown`] with the raw payload preserved, so a newer
/// tenant's data survives a round-trip through an older build.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text(TextOptions),
    Textarea(TextOptions),
    Number(NumberOptions),
    Email(TextOptions),
    Url(TextOptions),
    Phone(TextOptions),
    Checkbox,
    Select(ChoiceOptions),
    Multiselect(ChoiceOptions),
    Radio(ChoiceOptions),
    Date(DateOptions),
    Time(DateOptions),
    Datetime(DateOptions),
    File(FileOptions),
    Image(FileOptions),
    Rating(RatingOptions),
    Slider(NumberOptions),
    Section,
    Divider,
    Info(InfoOptions),
    Inspection(InspectionOptions),
    Unknown { raw_type: String, options: Value },
}

#[derive(Debug)]
pub enum FieldDecodeError {
    BadOptions {
        type_tag: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for FieldDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadOptions { type_tag, source } => {
                write!(f, "bad options for field type {type_tag}: {source}")
            }
        }
    }
}

impl std::error::Error for FieldDecodeError {}

impl FieldKind {
    pub fn type_tag(&self) -> &str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::Textarea(_) => "textarea",
            FieldKind::Number(_) => "number",
            FieldKind::Email(_) => "email",
            FieldKind::Url(_) => "url",
            FieldKind::Phone(_) => "phone",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select(_) => "select",
            FieldKind::Multiselect(_) => "multiselect",
            FieldKind::Radio(_) => "radio",
            FieldKind::Date(_) => "date",
            FieldKind::Time(_) => "time",
            FieldKind::Datetime(_) => "datetime",
            FieldKind::File(_) => "file",
            FieldKind::Image(_) => "image",
            FieldKind::Rating(_) => "rating",
            FieldKind::Slider(_) => "slider",
            FieldKind::Section => "section",
            FieldKind::Divider => "divider",
            FieldKind::Info(_) => "info",
            FieldKind::Inspection(_) => "inspection",
            FieldKind::Unknown { raw_type, .. } => raw_type,
        }
    }

    /// Decodes a stored `(type tag, options)` pair.
    pub fn from_parts(type_tag: &str, options: Value) -> Result<Self, FieldDecodeError> {
        // Absent options decode as the kind's defaults.
        let options = match options {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let kind = match type_tag.trim() {
            "text" => FieldKind::Text(decode(type_tag, options)?),
            "textarea" => FieldKind::Textarea(decode(type_tag, options)?),
            "number" => FieldKind::Number(decode(type_tag, options)?),
            "email" => FieldKind::Email(decode(type_tag, options)?),
            "url" => FieldKind::Url(decode(type_tag, options)?),
            "phone" => FieldKind::Phone(decode(type_tag, options)?),
            "checkbox" => FieldKind::Checkbox,
            "select" => FieldKind::Select(decode(type_tag, options)?),
            "multiselect" => FieldKind::Multiselect(decode(type_tag, options)?),
            "radio" => FieldKind::Radio(decode(type_tag, options)?),
            "date" => FieldKind::Date(decode(type_tag, options)?),
            "time" => FieldKind::Time(decode(type_tag, options)?),
            "datetime" => FieldKind::Datetime(decode(type_tag, options)?),
            "file" => FieldKind::File(decode(type_tag, options)?),
            "image" => FieldKind::Image(decode(type_tag, options)?),
            "rating" => FieldKind::Rating(decode(type_tag, options)?),
            "slider" => FieldKind::Slider(decode(type_tag, options)?),
            "section" => FieldKind::Section,
            "divider" => FieldKind::Divider,
            "info" => FieldKind::Info(decode(type_tag, options)?),
            "inspection" => FieldKind::Inspection(decode(type_tag, options)?),
            other => FieldKind::Unknown {
                raw_type: other.to_string(),
                options,
            },
        };
        Ok(kind)
    }

    /// Encodes the option payload back to its JSON shape.
    pub fn options_value(&self) -> Value {
        match self {
            FieldKind::Text(opts)
            | FieldKind::Textarea(opts)
            | FieldKind::Email(opts)
            | FieldKind::Url(opts)
            | FieldKind::Phone(opts) => encode(opts),
            FieldKind::Number(opts) | FieldKind::Slider(opts) => encode(opts),
            FieldKind::Select(opts) | FieldKind::Multiselect(opts) | FieldKind::Radio(opts) => {
                encode(opts)
            }
            FieldKind::Date(opts) | FieldKind::Time(opts) | FieldKind::Datetime(opts) => {
                encode(opts)
            }
            FieldKind::File(opts) | FieldKind::Image(opts) => encode(opts),
            FieldKind::Rating(opts) => encode(opts),
            FieldKind::Info(opts) => encode(opts),
            FieldKind::Inspection(opts) => encode(opts),
            FieldKind::Checkbox | FieldKind::Section | FieldKind::Divider => {
                Value::Object(Map::new())
            }
            FieldKind::Unknown { options, .. } => options.clone(),
        }
    }

    /// Whether fields of this kind carry an answer value. Section, divider and
    /// info are presentation-only; unknown kinds are treated as inputs so
    /// their values are never dropped.
    pub fn is_input(&self) -> bool {
        !matches!(
            self,
            FieldKind::Section | FieldKind::Divider | FieldKind::Info(_)
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Unknown { .. })
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    type_tag: &str,
    options: Value,
) -> Result<T, FieldDecodeError> {
    serde_json::from_value(options).map_err(|source| FieldDecodeError::BadOptions {
        type_tag: type_tag.to_string(),
        source,
    })
}

fn encode<T: serde::Serialize>(options: &T) -> Value {
    serde_json::to_value(options).unwrap_or_else(|_| Value::Object(Map::new()))
}
