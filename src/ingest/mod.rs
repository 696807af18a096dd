//! Zenoh ingest
//!
//! Opens the session and declares the single wildcard subscriber. Every
//! sample is wrapped into an [`Envelope`] and handed to the dispatcher
//! synchronously inside the subscriber callback.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;
use zenoh::Session;
use zenoh::pubsub::Subscriber;

use crate::bridge::{Dispatcher, Envelope};
use crate::config::ZenohSettings;
use crate::sink::Sink;
use crate::utils::error::{BridgeError, Result};

/// Build the session configuration: the optional config file first, then the
/// endpoint lists and mode from settings on top.
pub fn zenoh_config(settings: &ZenohSettings) -> Result<zenoh::Config> {
    let mut config = match &settings.config_file {
        Some(path) => zenoh::Config::from_file(path).map_err(|e| {
            BridgeError::Zenoh(format!("failed to load Zenoh config from {path}: {e}"))
        })?,
        None => zenoh::Config::default(),
    };

    if !settings.connect.is_empty() {
        config
            .insert_json5("connect/endpoints", &json_list(&settings.connect))
            .map_err(|e| BridgeError::Zenoh(format!("failed to set connect endpoints: {e}")))?;
    }
    if !settings.listen.is_empty() {
        config
            .insert_json5("listen/endpoints", &json_list(&settings.listen))
            .map_err(|e| BridgeError::Zenoh(format!("failed to set listen endpoints: {e}")))?;
    }
    config
        .insert_json5("mode", &format!("\"{}\"", settings.mode))
        .map_err(|e| BridgeError::Zenoh(format!("failed to set mode {}: {e}", settings.mode)))?;

    Ok(config)
}

fn json_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

pub async fn open_session(settings: &ZenohSettings) -> Result<Session> {
    let config = zenoh_config(settings)?;
    info!(mode = %settings.mode, "connecting to Zenoh network");
    let session = zenoh::open(config)
        .await
        .map_err(|e| BridgeError::Zenoh(format!("failed to open session: {e}")))?;
    info!(zid = %session.zid(), "Zenoh session established");
    Ok(session)
}

/// Declare the subscriber feeding `dispatcher`. Dropping the returned handle
/// ends the subscription.
pub async fn subscribe<S>(
    session: &Session,
    key_expr: &str,
    dispatcher: Arc<Mutex<Dispatcher<S>>>,
) -> Result<Subscriber<()>>
where
    S: Sink + Send + 'static,
{
    let subscriber = session
        .declare_subscriber(key_expr)
        .callback(move |sample| {
            let envelope = Envelope::new(
                sample.key_expr().as_str(),
                sample.payload().to_bytes().into_owned(),
            );
            // drops are already logged by the dispatcher
            let _ = dispatcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_message(&envelope);
        })
        .await
        .map_err(|e| BridgeError::Zenoh(format!("failed to subscribe to {key_expr}: {e}")))?;

    info!(key_expr, "subscribed");
    Ok(subscriber)
}
