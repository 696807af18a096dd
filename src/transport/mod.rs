//! The `transport` module serves viewer clients over WebSocket.
//!
//! It defines the requests clients may send and runs the server that accepts
//! connections, registers each one with the broker and forwards its
//! subscribe and unsubscribe requests.

pub mod message;
pub mod websocket;
