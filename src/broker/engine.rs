use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::channel::{Channel, SubscriberId};
use crate::broker::message::ServerMessage;
use crate::client::Client;
use crate::sink::{ChannelId, ChannelSpec, Sink};

/// Server name reported in `server_info`.
pub const DEFAULT_SERVER_NAME: &str = "foxbridge";

/// A subscribe or unsubscribe request named a channel that is not advertised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),
}

/// Represents the broker that manages channels and viewer clients
/// Channels are created by the bridge through the [`Sink`] implementation;
/// clients subscribe to them by id and receive every record logged on them
/// The public API is synchronous and meant to be held behind a lock by the
/// transport layer
#[derive(Debug)]
pub struct Broker {
    name: String,
    session_id: String,
    channels: HashMap<ChannelId, Channel>,
    clients: HashMap<SubscriberId, Client>,
    last_channel_id: ChannelId,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_NAME)
    }
}

impl Broker {
    /// Creates a broker with no channels and no clients
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            session_id: Uuid::new_v4().to_string(),
            channels: HashMap::new(),
            clients: HashMap::new(),
            last_channel_id: 0,
        }
    }

    /// Registers a new client with the broker
    /// The client is greeted with `server_info` and an `advertise` frame
    /// listing every live channel, so it can subscribe straight away
    pub fn register_client(&mut self, client: Client) {
        let greeting = ServerMessage::ServerInfo {
            name: self.name.clone(),
            session_id: self.session_id.clone(),
        };
        send(&client, &greeting);

        if !self.channels.is_empty() {
            let mut channels: Vec<_> = self.channels.values().map(Channel::info).collect();
            channels.sort_by_key(|info| info.id);
            send(&client, &ServerMessage::Advertise { channels });
        }

        debug!(client = %client.id, "registered client");
        self.clients.insert(client.id.clone(), client);
    }

    /// Removes a client from the broker without touching its subscriptions
    pub fn remove_client(&mut self, client_id: &SubscriberId) {
        self.clients.remove(client_id);
    }

    /// Subscribes a client to a channel
    pub fn subscribe(
        &mut self,
        channel_id: ChannelId,
        subscriber: SubscriberId,
    ) -> Result<(), SubscriptionError> {
        let channel = self
            .channels
            .get_mut(&channel_id)
            .ok_or(SubscriptionError::UnknownChannel(channel_id))?;
        channel.subscribe(subscriber);
        Ok(())
    }

    /// Unsubscribes a client from a channel
    pub fn unsubscribe(
        &mut self,
        channel_id: ChannelId,
        subscriber: &SubscriberId,
    ) -> Result<(), SubscriptionError> {
        let channel = self
            .channels
            .get_mut(&channel_id)
            .ok_or(SubscriptionError::UnknownChannel(channel_id))?;
        channel.unsubscribe(subscriber);
        Ok(())
    }

    /// Publishes a payload to all subscribers of a channel
    /// A channel without subscribers discards the payload
    pub fn publish(&self, channel_id: ChannelId, payload: &Value) {
        let Some(channel) = self.channels.get(&channel_id) else {
            warn!(channel = channel_id, "publish on unknown channel");
            return;
        };
        if channel.subscribers.is_empty() {
            return;
        }

        let frame = ServerMessage::Message {
            channel_id,
            topic: channel.spec.topic.clone(),
            log_time: chrono::Utc::now().timestamp_millis(),
            payload: payload.clone(),
        };
        let Some(ws_msg) = encode(&frame) else {
            return;
        };

        for sub_id in &channel.subscribers {
            match self.clients.get(sub_id) {
                Some(client) => {
                    if let Err(e) = client.sender.send(ws_msg.clone()) {
                        debug!(client = %sub_id, "failed to queue message: {e}");
                    }
                }
                None => warn!(client = %sub_id, "no client registered with this id"),
            }
        }
    }

    /// Sends a frame to one client, if it is still connected
    pub fn send_to(&self, client_id: &SubscriberId, frame: &ServerMessage) {
        if let Some(client) = self.clients.get(client_id) {
            send(client, frame);
        }
    }

    /// Sends a frame to every connected client
    fn broadcast(&self, frame: &ServerMessage) {
        let Some(ws_msg) = encode(frame) else {
            return;
        };
        for client in self.clients.values() {
            let _ = client.sender.send(ws_msg.clone());
        }
    }

    /// Cleans up a client by removing it and unsubscribing it from all channels
    pub fn cleanup_client(&mut self, client_id: &SubscriberId) {
        self.remove_client(client_id);

        for channel in self.channels.values_mut() {
            channel.unsubscribe(client_id);
        }

        info!(client = %client_id, "cleaned up client");
    }

    pub fn channel(&self, channel_id: ChannelId) -> Option<&Channel> {
        self.channels.get(&channel_id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn has_client(&self, client_id: &SubscriberId) -> bool {
        self.clients.contains_key(client_id)
    }
}

impl Sink for Broker {
    fn add_channel(&mut self, spec: ChannelSpec) -> ChannelId {
        self.last_channel_id += 1;
        let channel = Channel::new(self.last_channel_id, spec);
        self.broadcast(&ServerMessage::Advertise {
            channels: vec![channel.info()],
        });
        self.channels.insert(channel.id, channel);
        self.last_channel_id
    }

    fn remove_channel(&mut self, id: ChannelId) {
        if self.channels.remove(&id).is_some() {
            self.broadcast(&ServerMessage::Unadvertise {
                channel_ids: vec![id],
            });
        }
    }

    fn log(&mut self, id: ChannelId, payload: &Value) {
        self.publish(id, payload);
    }
}

fn encode(frame: &ServerMessage) -> Option<WsMessage> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(WsMessage::text(json)),
        Err(e) => {
            error!("failed to serialize frame: {e}");
            None
        }
    }
}

fn send(client: &Client, frame: &ServerMessage) {
    if let Some(ws_msg) = encode(frame) {
        if let Err(e) = client.sender.send(ws_msg) {
            debug!(client = %client.id, "failed to queue frame: {e}");
        }
    }
}
