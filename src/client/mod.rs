//! The `client` module defines the representation of a connected viewer.
//!
//! It provides the `Client` struct, which pairs a unique identifier with the
//! queue that feeds the client's WebSocket.

pub mod pubsub_client;
pub use pubsub_client::Client;
