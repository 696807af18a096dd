//! Encoded video frames published on `video/<camera>`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use super::{ShapeError, field, str_field, u32_field};
use crate::codec::kind_name;
use crate::records::{Timestamp, VideoFrame};

pub const DEFAULT_FRAME_ID: &str = "camera";

pub fn decode(data: &Map<String, Value>) -> Result<VideoFrame, ShapeError> {
    let bytes = frame_bytes(field(data, "data")?)?;
    let format = str_field(data, "format")?.to_string();

    let timestamp = match data.get("timestamp") {
        Some(Value::Object(ts)) => Timestamp::new(u32_field(ts, "sec")?, u32_field(ts, "nsec")?),
        _ => Timestamp::default(),
    };
    let frame_id = data
        .get("frame_id")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_FRAME_ID)
        .to_string();

    Ok(VideoFrame {
        timestamp,
        frame_id,
        data: bytes,
        format,
    })
}

/// `data` is either base64 text or an array of byte values.
fn frame_bytes(value: &Value) -> Result<Vec<u8>, ShapeError> {
    let invalid = || ShapeError::WrongType {
        field: "data".to_string(),
        expected: "base64 text or an array of bytes",
        found: kind_name(value),
    };

    match value {
        Value::String(text) => STANDARD.decode(text).map_err(|_| invalid()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(invalid)
            })
            .collect(),
        _ => Err(invalid()),
    }
}
