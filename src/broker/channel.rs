use std::collections::HashSet;

use crate::broker::message::ChannelInfo;
use crate::sink::{ChannelId, ChannelSpec};

pub type SubscriberId = String;

/// Represents one advertised channel in the broker
/// Holds the announcement the channel was created with and the set of
/// clients currently subscribed to it
#[derive(Debug)]
pub struct Channel {
    pub id: ChannelId,
    pub spec: ChannelSpec,
    pub subscribers: HashSet<SubscriberId>,
}

impl Channel {
    /// Creates a new channel with no subscribers
    pub fn new(id: ChannelId, spec: ChannelSpec) -> Self {
        Self {
            id,
            spec,
            subscribers: HashSet::new(),
        }
    }

    /// Adds a subscriber. Subscribing twice has no effect
    pub fn subscribe(&mut self, id: SubscriberId) {
        self.subscribers.insert(id);
    }

    /// Removes a subscriber if present
    pub fn unsubscribe(&mut self, id: &SubscriberId) {
        self.subscribers.remove(id);
    }

    /// The entry sent to clients in an `advertise` frame
    pub fn info(&self) -> ChannelInfo {
        ChannelInfo {
            id: self.id,
            topic: self.spec.topic.clone(),
            encoding: self.spec.encoding.clone(),
            schema_name: self.spec.schema_name.clone(),
            schema: self.spec.schema.clone(),
        }
    }
}
