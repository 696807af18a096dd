use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sink::ChannelId;

/// A channel as announced to viewer clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub topic: String,
    pub encoding: String,
    pub schema_name: String,
    /// Serialized JSON Schema; absent for schemaless channels.
    pub schema: Option<String>,
}

/// Frames sent from the server to viewer clients.
///
/// Every frame is a JSON object tagged by `type`:
///
/// - `server_info` - sent once when a client connects.
/// - `advertise` - one or more channels became available.
/// - `unadvertise` - channels were withdrawn; their ids are never reused.
/// - `message` - one record published on a channel the client subscribed to.
///   `log_time` is the publish time in milliseconds since the Unix epoch.
/// - `error` - a client request could not be honoured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "server_info")]
    ServerInfo { name: String, session_id: String },

    #[serde(rename = "advertise")]
    Advertise { channels: Vec<ChannelInfo> },

    #[serde(rename = "unadvertise")]
    Unadvertise { channel_ids: Vec<ChannelId> },

    #[serde(rename = "message")]
    Message {
        channel_id: ChannelId,
        topic: String,
        log_time: i64,
        payload: Value,
    },

    #[serde(rename = "error")]
    Error { message: String },
}
