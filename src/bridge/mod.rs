//! Bridge core
//!
//! The [`Dispatcher`] is the single entry point for inbound messages. It
//! classifies each [`Envelope`] by topic, runs the matching decoder, resolves
//! the output channel and publishes. Every failure along the way becomes a
//! [`DropReason`]; nothing escapes [`Dispatcher::on_message`].

mod dispatcher;

pub use dispatcher::Dispatcher;

use crate::codec::DecodeError;
use crate::decoders::ShapeError;
use crate::registry::Resolution;

/// One inbound unit, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Why a message was not forwarded.
#[derive(Debug, thiserror::Error)]
pub enum DropReason {
    #[error("undecodable payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("unexpected payload shape: {0}")]
    Shape(#[from] ShapeError),

    #[error("topic is ignored")]
    Ignored,
}

/// Running counters, reported periodically at `info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub received: u64,
    pub published: u64,
    pub dropped: u64,
    pub ignored: u64,
    pub channels_created: u64,
    pub channels_replaced: u64,
}

impl BridgeStats {
    fn record_drop(&mut self, reason: &DropReason) {
        match reason {
            DropReason::Ignored => self.ignored += 1,
            DropReason::Decode(_) | DropReason::Shape(_) => self.dropped += 1,
        }
    }

    fn record_resolution(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Existing(_) => {}
            Resolution::Created(_) => self.channels_created += 1,
            Resolution::Replaced { .. } => self.channels_replaced += 1,
        }
    }
}

#[cfg(test)]
mod tests;
