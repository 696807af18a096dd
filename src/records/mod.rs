//! Fixed-shape output records and the JSON Schemas announced for them.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};
use serde_json::json;

use crate::sink::ChannelSchema;

/// Seconds and nanoseconds since an arbitrary epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub sec: u32,
    pub nsec: u32,
}

impl Timestamp {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self {
            sec: u32::try_from(millis / 1000).unwrap_or(u32::MAX),
            nsec: ((millis % 1000) * 1_000_000) as u32,
        }
    }
}

/// Geodetic fix in degrees and meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFix {
    pub frame_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Severity of a service log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum LogLevel {
    Unknown = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Total mapping from the wire integer; out-of-range values are `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warning,
            4 => LogLevel::Error,
            5 => LogLevel::Fatal,
            _ => LogLevel::Unknown,
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log {
    pub timestamp: Timestamp,
    pub level: LogLevel,
    pub message: String,
    pub name: String,
    pub file: String,
    pub line: u32,
}

/// One encoded video frame. `data` is base64 on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoFrame {
    pub timestamp: Timestamp,
    pub frame_id: String,
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
    pub format: String,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn timestamp_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "sec": { "type": "integer", "minimum": 0 },
            "nsec": { "type": "integer", "minimum": 0, "maximum": 999_999_999 }
        },
        "required": ["sec", "nsec"]
    })
}

fn vector3_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "x": { "type": "number" },
            "y": { "type": "number" },
            "z": { "type": "number" }
        },
        "required": ["x", "y", "z"]
    })
}

fn quaternion_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "x": { "type": "number" },
            "y": { "type": "number" },
            "z": { "type": "number" },
            "w": { "type": "number" }
        },
        "required": ["x", "y", "z", "w"]
    })
}

pub static LOCATION_FIX_SCHEMA: LazyLock<ChannelSchema> = LazyLock::new(|| {
    ChannelSchema::new(
        "foxglove.LocationFix",
        json!({
            "type": "object",
            "properties": {
                "frame_id": { "type": "string" },
                "latitude": { "type": "number" },
                "longitude": { "type": "number" },
                "altitude": { "type": "number" }
            },
            "required": ["frame_id", "latitude", "longitude", "altitude"]
        }),
    )
});

pub static LOG_SCHEMA: LazyLock<ChannelSchema> = LazyLock::new(|| {
    ChannelSchema::new(
        "foxglove.Log",
        json!({
            "type": "object",
            "properties": {
                "timestamp": timestamp_schema(),
                "level": { "type": "integer", "enum": [0, 1, 2, 3, 4, 5] },
                "message": { "type": "string" },
                "name": { "type": "string" },
                "file": { "type": "string" },
                "line": { "type": "integer", "minimum": 0 }
            },
            "required": ["timestamp", "level", "message", "name", "file", "line"]
        }),
    )
});

pub static VIDEO_FRAME_SCHEMA: LazyLock<ChannelSchema> = LazyLock::new(|| {
    ChannelSchema::new(
        "foxglove.CompressedVideo",
        json!({
            "type": "object",
            "properties": {
                "timestamp": timestamp_schema(),
                "frame_id": { "type": "string" },
                "data": { "type": "string", "contentEncoding": "base64" },
                "format": { "type": "string" }
            },
            "required": ["timestamp", "frame_id", "data", "format"]
        }),
    )
});

pub static POSE_SCHEMA: LazyLock<ChannelSchema> = LazyLock::new(|| {
    ChannelSchema::new(
        "foxglove.Pose",
        json!({
            "type": "object",
            "properties": {
                "position": vector3_schema(),
                "orientation": quaternion_schema()
            },
            "required": ["position", "orientation"]
        }),
    )
});

pub static FRAME_TRANSFORM_SCHEMA: LazyLock<ChannelSchema> = LazyLock::new(|| {
    ChannelSchema::new(
        "foxglove.FrameTransform",
        json!({
            "type": "object",
            "properties": {
                "timestamp": timestamp_schema(),
                "parent_frame_id": { "type": "string" },
                "child_frame_id": { "type": "string" },
                "translation": vector3_schema(),
                "rotation": quaternion_schema()
            },
            "required": ["timestamp", "parent_frame_id", "child_frame_id", "translation", "rotation"]
        }),
    )
});
