//! Channel registry
//!
//! Lazily creates one output channel per `(topic, class)` and caches its id.
//! Fixed-schema classes get their channel once. For the dynamic class the
//! channel is replaced whenever the serialized schema differs from the one the
//! current channel was announced with; the swap is a single map insert, so the
//! next lookup always sees the new channel.

use std::collections::HashMap;

use tracing::info;

use crate::router::TopicClass;
use crate::sink::{ChannelId, ChannelSchema, ChannelSpec, Sink};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub topic: String,
    pub class: TopicClass,
}

impl ChannelKey {
    pub fn new(topic: &str, class: TopicClass) -> Self {
        Self {
            topic: topic.to_string(),
            class,
        }
    }
}

/// Live channel for a key, plus the schema it was announced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub id: ChannelId,
    pub schema: Option<String>,
}

/// What [`ChannelRegistry::resolve`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Existing(ChannelId),
    Created(ChannelId),
    /// The schema drifted: `old` was withdrawn and `new` announced.
    Replaced { old: ChannelId, new: ChannelId },
}

impl Resolution {
    /// Channel to publish on.
    pub fn id(self) -> ChannelId {
        match self {
            Resolution::Existing(id) | Resolution::Created(id) => id,
            Resolution::Replaced { new, .. } => new,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChannelRegistry {
    entries: HashMap<ChannelKey, ChannelEntry>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the channel for `(topic, class)`, creating or replacing it as
    /// needed. `schema` is only consulted on creation for fixed-schema classes.
    pub fn resolve<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        topic: &str,
        class: TopicClass,
        schema: &ChannelSchema,
    ) -> Resolution {
        let key = ChannelKey::new(topic, class);

        let Some(entry) = self.entries.get(&key) else {
            let id = sink.add_channel(ChannelSpec::new(topic, schema));
            info!(topic, %class, channel = id, "created channel");
            self.entries.insert(
                key,
                ChannelEntry {
                    id,
                    schema: schema.serialized(),
                },
            );
            return Resolution::Created(id);
        };

        if class.has_fixed_schema() {
            return Resolution::Existing(entry.id);
        }

        let serialized = schema.serialized();
        if entry.schema == serialized {
            return Resolution::Existing(entry.id);
        }

        let old = entry.id;
        sink.remove_channel(old);
        let new = sink.add_channel(ChannelSpec::new(topic, schema));
        info!(topic, old, new, "schema changed, replaced channel");
        self.entries.insert(
            key,
            ChannelEntry {
                id: new,
                schema: serialized,
            },
        );
        Resolution::Replaced { old, new }
    }

    pub fn get(&self, topic: &str, class: TopicClass) -> Option<&ChannelEntry> {
        self.entries.get(&ChannelKey::new(topic, class))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Withdraw every channel. Used at shutdown.
    pub fn clear<S: Sink + ?Sized>(&mut self, sink: &mut S) {
        for (_, entry) in self.entries.drain() {
            sink.remove_channel(entry.id);
        }
    }
}
