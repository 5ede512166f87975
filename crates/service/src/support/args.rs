#![forbid(unsafe_code)]

use super::responses::error;
use serde_json::{Map, Value};

pub(crate) fn require_object(args: &Value) -> Result<&Map<String, Value>, Value> {
    match args.as_object() {
        Some(object) => Ok(object),
        None => Err(error("INVALID_INPUT", "arguments must be an object")),
    }
}

pub(crate) fn require_string(
    args: &Map<String, Value>,
    key: &str,
) -> Result<String, Value> {
    let Some(v) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(error("INVALID_INPUT", &format!("{key} is required")));
    };
    Ok(v.to_string())
}

pub(crate) fn optional_string(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => Ok(Some(v.to_string())),
        _ => Err(error("INVALID_INPUT", &format!("{key} must be a string"))),
    }
}

/// Distinguishes an absent key (leave alone) from an explicit null (clear).
pub(crate) fn optional_clearable_string(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Option<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(Some(None)),
        Value::String(v) => Ok(Some(Some(v.to_string()))),
        _ => Err(error("INVALID_INPUT", &format!("{key} must be a string"))),
    }
}

pub(crate) fn optional_bool(args: &Map<String, Value>, key: &str) -> Result<Option<bool>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Bool(v) => Ok(Some(*v)),
        _ => Err(error("INVALID_INPUT", &format!("{key} must be a boolean"))),
    }
}

pub(crate) fn optional_f64(args: &Map<String, Value>, key: &str) -> Result<Option<f64>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(v) => match v.as_f64() {
            Some(v) => Ok(Some(v)),
            None => Err(error("INVALID_INPUT", &format!("{key} must be a number"))),
        },
        _ => Err(error("INVALID_INPUT", &format!("{key} must be a number"))),
    }
}

pub(crate) fn optional_string_array(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(text) = item.as_str() else {
                    return Err(error(
                        "INVALID_INPUT",
                        &format!("{key} must be an array of strings"),
                    ));
                };
                out.push(text.to_string());
            }
            Ok(Some(out))
        }
        _ => Err(error(
            "INVALID_INPUT",
            &format!("{key} must be an array of strings"),
        )),
    }
}

const DEFAULT_PAGE_LIMIT: usize = 50;
const MAX_PAGE_LIMIT: usize = 500;

pub(crate) fn page_args(args: &Map<String, Value>) -> Result<(usize, usize), Value> {
    let limit = match args.get("limit") {
        None | Some(Value::Null) => DEFAULT_PAGE_LIMIT,
        Some(Value::Number(v)) => match v.as_u64() {
            Some(v) if v >= 1 => (v as usize).min(MAX_PAGE_LIMIT),
            _ => return Err(error("INVALID_INPUT", "limit must be a positive integer")),
        },
        Some(_) => return Err(error("INVALID_INPUT", "limit must be a positive integer")),
    };
    let offset = match args.get("offset") {
        None | Some(Value::Null) => 0,
        Some(Value::Number(v)) => match v.as_u64() {
            Some(v) => v as usize,
            None => return Err(error("INVALID_INPUT", "offset must be a non-negative integer")),
        },
        Some(_) => {
            return Err(error("INVALID_INPUT", "offset must be a non-negative integer"));
        }
    };
    Ok((limit, offset))
}
