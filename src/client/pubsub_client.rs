use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

/// A viewer connected over WebSocket.
///
/// Each client is uniquely identified by an `id` and has a channel (`sender`)
/// feeding the task that writes to its socket.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier, `client-<uuid>`.
    pub id: String,

    /// Channel to send WebSocket messages to the client.
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    /// Create a new client with a fresh id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            sender,
        }
    }
}
