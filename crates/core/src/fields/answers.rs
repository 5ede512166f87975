#![forbid(unsafe_code)]

use crate::model::InspectionResult;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// One answer inside an execution: a scalar, a string list, or the
/// inspection composite `{value, comment}`.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    Inspection {
        result: InspectionResult,
        comment: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerDecodeError {
    NotAnObject,
    UnsupportedValue { field_id: String },
    BadInspectionValue { field_id: String },
}

impl std::fmt::Display for AnswerDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "answers must be a JSON object"),
            Self::UnsupportedValue { field_id } => {
                write!(f, "unsupported answer value for field {field_id}")
            }
            Self::BadInspectionValue { field_id } => {
                write!(f, "bad inspection answer for field {field_id}")
            }
        }
    }
}

impl std::error::Error for AnswerDecodeError {}

impl AnswerValue {
    pub fn from_value(field_id: &str, value: &Value) -> Result<Self, AnswerDecodeError> {
        match value {
            Value::String(text) => Ok(AnswerValue::Text(text.clone())),
            Value::Number(number) => match number.as_f64() {
                Some(number) => Ok(AnswerValue::Number(number)),
                None => Err(AnswerDecodeError::UnsupportedValue {
                    field_id: field_id.to_string(),
                }),
            },
            Value::Bool(flag) => Ok(AnswerValue::Bool(*flag)),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    let Some(text) = item.as_str() else {
                        return Err(AnswerDecodeError::UnsupportedValue {
                            field_id: field_id.to_string(),
                        });
                    };
                    list.push(text.to_string());
                }
                Ok(AnswerValue::List(list))
            }
            Value::Object(object) => {
                let Some(raw) = object.get("value").and_then(|v| v.as_str()) else {
                    return Err(AnswerDecodeError::BadInspectionValue {
                        field_id: field_id.to_string(),
                    });
                };
                let Some(result) = InspectionResult::parse(raw) else {
                    return Err(AnswerDecodeError::BadInspectionValue {
                        field_id: field_id.to_string(),
                    });
                };
                let comment = match object.get("comment") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(comment)) => Some(comment.clone()),
                    Some(_) => {
                        return Err(AnswerDecodeError::BadInspectionValue {
                            field_id: field_id.to_string(),
                        });
                    }
                };
                Ok(AnswerValue::Inspection { result, comment })
            }
            Value::Null => Err(AnswerDecodeError::UnsupportedValue {
                field_id: field_id.to_string(),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AnswerValue::Text(text) => Value::String(text.clone()),
            AnswerValue::Number(number) => json!(number),
            AnswerValue::Bool(flag) => Value::Bool(*flag),
            AnswerValue::List(items) => json!(items),
            AnswerValue::Inspection { result, comment } => json!({
                "value": result.as_str(),
                "comment": comment,
            }),
        }
    }
}

/// The answer-set of an execution: field id to answer value. Keys are kept
/// sorted so the stored JSON is stable across round-trips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Answers {
    entries: BTreeMap<String, AnswerValue>,
}

impl Answers {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, AnswerDecodeError> {
        let Value::Object(object) = value else {
            return Err(AnswerDecodeError::NotAnObject);
        };
        let mut entries = BTreeMap::new();
        for (field_id, raw) in object {
            entries.insert(field_id.clone(), AnswerValue::from_value(field_id, raw)?);
        }
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (field_id, answer) in &self.entries {
            object.insert(field_id.clone(), answer.to_value());
        }
        Value::Object(object)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, answer: AnswerValue) {
        self.entries.insert(field_id.into(), answer);
    }

    pub fn get(&self, field_id: &str) -> Option<&AnswerValue> {
        self.entries.get(field_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.entries
            .iter()
            .map(|(field_id, answer)| (field_id.as_str(), answer))
    }
}
