//! Payload codec.
//!
//! Every inbound payload is expected to be UTF-8 JSON. Decoding fails closed:
//! callers drop the message on any [`DecodeError`].

use serde_json::{Map, Value};

/// Why a payload could not be turned into a structured value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Valid JSON, but the caller requires an object at the top level.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Decode raw bytes into a JSON value of any kind.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(serde_json::from_str(text)?)
}

/// Decode raw bytes and require a top-level object.
pub fn decode_object(bytes: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    match decode(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject(kind_name(&other))),
    }
}

/// Short JSON type name, used in diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
