//! Application lifecycle management.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info};

use crate::bridge::Dispatcher;
use crate::broker::Broker;
use crate::config::Settings;
use crate::ingest;
use crate::transport::websocket::start_websocket_server;
use crate::utils::error::{BridgeError, Result};
use crate::web::start_http_server;

/// Run the bridge until Ctrl+C or until one of the servers fails.
pub async fn run(settings: Settings) -> Result<()> {
    let ws_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let http_addr = format!("{}:{}", settings.http.host, settings.http.port);

    let broker = Arc::new(Mutex::new(Broker::default()));
    let dispatcher = Arc::new(Mutex::new(Dispatcher::new(broker.clone(), &settings.bridge)));

    let session = ingest::open_session(&settings.zenoh).await?;
    let subscriber = ingest::subscribe(&session, &settings.zenoh.key_expr, dispatcher.clone()).await?;

    let outcome = tokio::select! {
        res = start_websocket_server(&ws_addr, broker.clone()) => {
            error!("WebSocket server exited unexpectedly.");
            res
        }
        res = start_http_server(&http_addr) => {
            error!("Web server exited unexpectedly.");
            res
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
            Ok(())
        }
    };

    // no more samples after this point
    drop(subscriber);
    session
        .close()
        .await
        .map_err(|e| BridgeError::Zenoh(format!("failed to close session: {e}")))?;

    let mut dispatcher = dispatcher.lock().unwrap_or_else(PoisonError::into_inner);
    dispatcher.shutdown();
    let stats = dispatcher.stats();
    info!(
        received = stats.received,
        published = stats.published,
        dropped = stats.dropped,
        ignored = stats.ignored,
        "bridge stopped"
    );

    outcome
}
