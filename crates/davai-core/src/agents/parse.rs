//! Structured-output parsing for LLM responses

use crate::error::{DavaiError, Result};
use serde_json::{Map, Value};

/// Remove a surrounding Markdown code fence (```` ```json ```` ... ```` ``` ````), if any
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") || trimmed.len() < 6 || !trimmed.ends_with("```") {
        return trimmed;
    }

    // Drop the opening fence line, including any language tag
    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => trimmed.trim_start_matches('`'),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a response as a single JSON object.
///
/// Text that is not JSON is a `Parse` error; JSON that is not an object is a `Schema` error.
/// Both carry the raw response.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        DavaiError::parse(format!("Response is not valid JSON: {}", e), raw)
    })?;

    match value {
        Value::Object(object) => Ok(object),
        other => Err(DavaiError::schema(
            format!("Expected a JSON object, got {}", json_type(&other)),
            raw,
        )),
    }
}

/// Required array-of-strings field; entries are trimmed and must not be blank
pub fn string_list(object: &Map<String, Value>, key: &str, raw: &str) -> Result<Vec<String>> {
    let items = object
        .get(key)
        .ok_or_else(|| DavaiError::schema(format!("Response missing '{}' field", key), raw))?
        .as_array()
        .ok_or_else(|| DavaiError::schema(format!("'{}' must be an array", key), raw))?;

    let mut list = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let text = item.as_str().ok_or_else(|| {
            DavaiError::schema(
                format!("'{}' entries must be strings, found {}", key, json_type(item)),
                raw,
            )
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(DavaiError::schema(
                format!("'{}' entry {} is blank", key, i + 1),
                raw,
            ));
        }
        list.push(text.to_string());
    }
    Ok(list)
}

/// Optional string field; present but not a string is a schema error
pub fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    raw: &str,
) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DavaiError::schema(
            format!("'{}' must be a string, found {}", key, json_type(other)),
            raw,
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
