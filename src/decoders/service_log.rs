//! Service log records published on `services/<name>/log`.

use serde_json::{Map, Value};

use super::{ShapeError, i64_field, str_field, u32_field};
use crate::records::{Log, LogLevel, Timestamp};

pub fn decode(data: &Map<String, Value>) -> Result<Log, ShapeError> {
    Ok(Log {
        level: LogLevel::from_code(i64_field(data, "level")?),
        message: str_field(data, "message")?.to_string(),
        name: str_field(data, "name")?.to_string(),
        file: str_field(data, "file")?.to_string(),
        line: u32_field(data, "line")?,
        timestamp: Timestamp::new(
            u32_field(data, "timestamp.sec")?,
            u32_field(data, "timestamp.nsec")?,
        ),
    })
}
