//! The `broker` module is the concrete visualization sink.
//!
//! It keeps the set of advertised channels and the viewer clients connected
//! to the server, and fans every published record out to the clients
//! subscribed to its channel.

pub mod channel;
pub mod engine;
pub mod message;

pub use engine::{Broker, SubscriptionError};
