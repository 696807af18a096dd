//! The `error` module defines the error type for bridge startup and the
//! long-running server tasks.
//!
//! Per-message failures never use this type; they are reported as
//! [`DropReason`](crate::bridge::DropReason) and swallowed at the dispatcher.

/// Errors that stop the bridge or one of its servers.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A socket could not be bound or a server loop failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The Zenoh session or subscriber could not be set up.
    #[error("zenoh error: {0}")]
    Zenoh(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
