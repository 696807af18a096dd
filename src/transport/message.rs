use serde::{Deserialize, Serialize};

use crate::sink::ChannelId;

/// Requests a viewer client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { channel_id: ChannelId },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { channel_id: ChannelId },
}
