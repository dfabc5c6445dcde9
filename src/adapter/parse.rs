//! Deserialization of embedded element text into label and score series.

use serde_json::Value;

use crate::error::ChartError;

/// Parse a label series.
///
/// Strings are taken as-is; numbers and booleans are stringified with their JSON
/// text (`2024` -> `"2024"`). Anything else is malformed.
pub fn parse_labels(id: &str, text: &str) -> Result<Vec<String>, ChartError> {
    parse_array(id, text)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(ChartError::malformed(
                id,
                format!("label {i} is {}, expected a string", kind(&other)),
            )),
        })
        .collect()
}

/// Parse a score series. Every element must be a JSON number.
pub fn parse_scores(id: &str, text: &str) -> Result<Vec<f64>, ChartError> {
    parse_array(id, text)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64().ok_or_else(|| {
                ChartError::malformed(id, format!("value {i} is {}, expected a number", kind(&v)))
            })
        })
        .collect()
}

fn parse_array(id: &str, text: &str) -> Result<Vec<Value>, ChartError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| ChartError::malformed(id, format!("invalid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ChartError::malformed(
            id,
            format!("expected an array, found {}", kind(&other)),
        )),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
