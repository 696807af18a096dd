//! Topics no rule matched. The payload is forwarded as-is once it passes the
//! incomplete-frame check.

use serde_json::{Map, Value};

use super::ShapeError;

/// Reject telemetry-shaped records that lack their `message` part.
pub fn check(data: &Map<String, Value>) -> Result<(), ShapeError> {
    if data.contains_key("header") && !data.contains_key("message") {
        return Err(ShapeError::IncompleteFrame);
    }
    Ok(())
}
