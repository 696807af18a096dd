//! Output side of the bridge.
//!
//! A [`Sink`] owns named, schema-bearing channels and accepts one JSON
//! message at a time for a channel. Creating a channel is externally visible
//! (viewers see a new stream), so callers go through the
//! [`ChannelRegistry`](crate::registry::ChannelRegistry) rather than calling
//! [`Sink::add_channel`] directly.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

/// Identifier assigned by the sink to a live channel.
pub type ChannelId = u32;

/// Message encoding of every channel the bridge creates.
pub const JSON_ENCODING: &str = "json";

/// Schema attached to a channel: a name plus an optional JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSchema {
    pub name: String,
    pub definition: Option<Value>,
}

impl ChannelSchema {
    pub fn new(name: impl Into<String>, definition: Value) -> Self {
        Self {
            name: name.into(),
            definition: Some(definition),
        }
    }

    /// A channel that carries JSON without declaring its shape.
    pub fn schemaless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
        }
    }

    /// Canonical text form. Two schemas are the same iff these strings match.
    pub fn serialized(&self) -> Option<String> {
        self.definition.as_ref().map(Value::to_string)
    }
}

/// Everything a sink needs to announce a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    pub topic: String,
    pub encoding: String,
    pub schema_name: String,
    /// Serialized JSON Schema, absent for schemaless channels.
    pub schema: Option<String>,
}

impl ChannelSpec {
    pub fn new(topic: &str, schema: &ChannelSchema) -> Self {
        Self {
            topic: topic.to_string(),
            encoding: JSON_ENCODING.to_string(),
            schema_name: schema.name.clone(),
            schema: schema.serialized(),
        }
    }
}

/// The typed-channel primitive the dispatcher publishes through.
pub trait Sink {
    /// Announce a new channel and return its id.
    fn add_channel(&mut self, spec: ChannelSpec) -> ChannelId;

    /// Withdraw a channel. Unknown ids are ignored.
    fn remove_channel(&mut self, id: ChannelId);

    /// Publish one message on a channel. Fire-and-forget.
    fn log(&mut self, id: ChannelId, payload: &Value);
}

/// Lets the dispatcher share a sink with the network layer.
impl<S: Sink> Sink for Arc<Mutex<S>> {
    fn add_channel(&mut self, spec: ChannelSpec) -> ChannelId {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_channel(spec)
    }

    fn remove_channel(&mut self, id: ChannelId) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_channel(id)
    }

    fn log(&mut self, id: ChannelId, payload: &Value) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log(id, payload)
    }
}

/// Sink that records every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub created: Vec<(ChannelId, ChannelSpec)>,
    pub removed: Vec<ChannelId>,
    pub logged: Vec<(ChannelId, Value)>,
    next_id: ChannelId,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topic of a channel created at any point.
    pub fn topic_of(&self, id: ChannelId) -> Option<&str> {
        self.created
            .iter()
            .find(|(created, _)| *created == id)
            .map(|(_, spec)| spec.topic.as_str())
    }

    /// Every message published on `topic`, across channel replacements.
    pub fn logged_on(&self, topic: &str) -> Vec<&Value> {
        self.logged
            .iter()
            .filter(|(id, _)| self.topic_of(*id) == Some(topic))
            .map(|(_, payload)| payload)
            .collect()
    }
}

#[cfg(test)]
impl Sink for RecordingSink {
    fn add_channel(&mut self, spec: ChannelSpec) -> ChannelId {
        self.next_id += 1;
        self.created.push((self.next_id, spec));
        self.next_id
    }

    fn remove_channel(&mut self, id: ChannelId) {
        self.removed.push(id);
    }

    fn log(&mut self, id: ChannelId, payload: &Value) {
        self.logged.push((id, payload.clone()));
    }
}
