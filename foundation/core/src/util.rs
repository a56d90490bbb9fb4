use serde_json::Value;

use crate::error::Error;

/// Coerces a JSON value into a list of strings.
///
/// Only an array of strings is accepted. Anything else, a bare string
/// included, is a caller error surfaced immediately.
pub fn ensure_string_array(name: &str, value: &Value) -> Result<Vec<String>, Error> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::InvalidSequence {
                name: name.to_string(),
                found: json_type(other),
            })
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(Error::InvalidElement {
                name: name.to_string(),
                index,
                found: json_type(other),
            }),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
