//! Per-class payload decoders.
//!
//! Each decoder takes an already-decoded JSON object and either produces the
//! class-specific record or a [`ShapeError`] naming the first field that did
//! not fit. None of them touch channels or the sink.

pub mod service_log;
pub mod telemetry;
pub mod unknown;
pub mod video;

use serde_json::{Map, Value};

use crate::codec::kind_name;

/// Decoded payload did not have the fields its class requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{field}` should be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A multi-part telemetry frame arrived without its `message` part.
    #[error("incomplete frame: `header` without `message`")]
    IncompleteFrame,
}

/// Look up a dotted path such as `timestamp.sec`.
pub(crate) fn field<'a>(object: &'a Map<String, Value>, path: &str) -> Result<&'a Value, ShapeError> {
    let mut segments = path.split('.');
    let first = segments.next().unwrap_or(path);
    let mut current = object
        .get(first)
        .ok_or_else(|| ShapeError::MissingField(path.to_string()))?;
    for segment in segments {
        current = current
            .get(segment)
            .ok_or_else(|| ShapeError::MissingField(path.to_string()))?;
    }
    Ok(current)
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> ShapeError {
    ShapeError::WrongType {
        field: path.to_string(),
        expected,
        found: kind_name(found),
    }
}

pub(crate) fn str_field<'a>(object: &'a Map<String, Value>, path: &str) -> Result<&'a str, ShapeError> {
    let value = field(object, path)?;
    value
        .as_str()
        .ok_or_else(|| wrong_type(path, "a string", value))
}

pub(crate) fn f64_field(object: &Map<String, Value>, path: &str) -> Result<f64, ShapeError> {
    let value = field(object, path)?;
    value
        .as_f64()
        .ok_or_else(|| wrong_type(path, "a number", value))
}

pub(crate) fn i64_field(object: &Map<String, Value>, path: &str) -> Result<i64, ShapeError> {
    let value = field(object, path)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| wrong_type(path, "an integer", value))
}

/// Non-negative number that fits in `u32`; fractional parts are truncated.
pub(crate) fn u32_field(object: &Map<String, Value>, path: &str) -> Result<u32, ShapeError> {
    let value = field(object, path)?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| wrong_type(path, "a non-negative 32-bit integer", value))
}

pub(crate) fn object_field<'a>(
    object: &'a Map<String, Value>,
    path: &str,
) -> Result<&'a Map<String, Value>, ShapeError> {
    let value = field(object, path)?;
    value
        .as_object()
        .ok_or_else(|| wrong_type(path, "an object", value))
}
