//! Telemetry frames: `{"header": {...}, "message": {"type": "...", ...}}`.
//!
//! Several message subtypes are multiplexed on one inbound topic; each is
//! republished on its own `telemetry/<source>/<link>/<type>` topic.

use serde_json::{Map, Value};

use super::{ShapeError, f64_field, object_field, str_field};
use crate::pose::{Attitude, LocalPosition};
use crate::records::LocationFix;

pub const GLOBAL_POSITION_INT: &str = "GLOBAL_POSITION_INT";
pub const ATTITUDE: &str = "ATTITUDE";
pub const LOCAL_POSITION_NED: &str = "LOCAL_POSITION_NED";

/// Frame id of derived location fixes.
pub const POSITION_FRAME: &str = "map";

/// Facts derived from well-known subtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    Position(LocationFix),
    Attitude(Attitude),
    LocalPosition(LocalPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// Outbound topic, re-keyed by subtype.
    pub topic: String,
    pub subtype: String,
    /// The full decoded payload, republished as-is.
    pub data: Value,
    /// `None` for subtypes nothing is derived from. A failed derivation does
    /// not invalidate the record itself.
    pub derived: Option<Result<Derived, ShapeError>>,
}

pub fn decode(topic: &str, data: Map<String, Value>) -> Result<TelemetryRecord, ShapeError> {
    let message = object_field(&data, "message")?;
    let subtype = str_field(message, "type")?.to_string();

    let derived = derive(&subtype, message);

    Ok(TelemetryRecord {
        topic: outbound_topic(topic, &subtype),
        subtype,
        data: Value::Object(data),
        derived,
    })
}

/// Extract the derived fact for well-known subtypes.
pub fn derive(subtype: &str, message: &Map<String, Value>) -> Option<Result<Derived, ShapeError>> {
    let derived = match subtype {
        GLOBAL_POSITION_INT => location_fix(message).map(Derived::Position),
        ATTITUDE => attitude(message).map(Derived::Attitude),
        LOCAL_POSITION_NED => local_position(message).map(Derived::LocalPosition),
        _ => return None,
    };
    Some(derived)
}

/// `telemetry/<source>/<link>/...` becomes `telemetry/<source>/<link>/<subtype>`.
pub fn outbound_topic(topic: &str, subtype: &str) -> String {
    let prefix: Vec<&str> = topic.split('/').take(3).collect();
    format!("{}/{subtype}", prefix.join("/"))
}

/// Fixed-point `lat`/`lon` (1e7 degrees) and `alt` (millimeters) to degrees and meters.
pub fn location_fix(message: &Map<String, Value>) -> Result<LocationFix, ShapeError> {
    Ok(LocationFix {
        frame_id: POSITION_FRAME.to_string(),
        latitude: f64_field(message, "lat")? / 1e7,
        longitude: f64_field(message, "lon")? / 1e7,
        altitude: f64_field(message, "alt")? / 1000.0,
    })
}

fn attitude(message: &Map<String, Value>) -> Result<Attitude, ShapeError> {
    Ok(Attitude {
        roll: f64_field(message, "roll")?,
        pitch: f64_field(message, "pitch")?,
        yaw: f64_field(message, "yaw")?,
    })
}

fn local_position(message: &Map<String, Value>) -> Result<LocalPosition, ShapeError> {
    let time_boot_ms = message
        .get("time_boot_ms")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    Ok(LocalPosition {
        x: f64_field(message, "x")?,
        y: f64_field(message, "y")?,
        z: f64_field(message, "z")?,
        time_boot_ms,
    })
}
