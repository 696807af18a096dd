//! WebSocket transport
//!
//! One task per connection. The broker pushes frames into a per-client queue
//! that a writer task drains into the socket; the reader loop turns client
//! JSON into broker calls. The broker lock is never held across socket I/O.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::broker::Broker;
use crate::broker::channel::SubscriberId;
use crate::broker::message::ServerMessage;
use crate::client::Client;
use crate::transport::message::ClientMessage;
use crate::utils::error::Result;

/// Bind `addr` and serve viewer clients until the listener fails.
pub async fn start_websocket_server(addr: &str, broker: Arc<Mutex<Broker>>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);
    serve(listener, broker).await;
    Ok(())
}

/// Accept connections on an already bound listener.
pub async fn serve(listener: TcpListener, broker: Arc<Mutex<Broker>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                spawn(handle_connection(stream, broker.clone()));
            }
            Err(e) => {
                warn!("failed to accept connection: {e}");
                break;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<Mutex<Broker>>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx);
    let client_id = client.id.clone();
    lock(&broker).register_client(client);
    info!(client = %client_id, "client connected");

    let cleanup_called = Arc::new(AtomicBool::new(false));
    let do_cleanup = {
        let broker = broker.clone();
        let client_id = client_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                lock(&broker).cleanup_client(&client_id);
            }
        }
    };

    {
        let client_id = client_id.clone();
        let do_cleanup = do_cleanup.clone();

        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    debug!(client = %client_id, "failed to send message: {e}");
                    break;
                }
            }
            do_cleanup();
            debug!(client = %client_id, "send loop closed");
        });
    }

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            WsMessage::Text(text) => {
                handle_client_message(&mut lock(&broker), &client_id, text.as_str());
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!(client = %client_id, "client disconnected");
    do_cleanup();
}

/// Apply one client request to the broker.
///
/// Requests naming an unknown channel are answered with an `error` frame;
/// unparseable requests are logged and ignored.
pub fn handle_client_message(broker: &mut Broker, client_id: &SubscriberId, text: &str) {
    let result = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe { channel_id }) => broker
            .subscribe(channel_id, client_id.clone())
            .map(|()| debug!(client = %client_id, channel = channel_id, "subscribed")),
        Ok(ClientMessage::Unsubscribe { channel_id }) => broker
            .unsubscribe(channel_id, client_id)
            .map(|()| debug!(client = %client_id, channel = channel_id, "unsubscribed")),
        Err(err) => {
            warn!(
                client = %client_id,
                "Invalid client message: {err} | {}",
                text.chars().take(100).collect::<String>()
            );
            return;
        }
    };

    if let Err(err) = result {
        broker.send_to(
            client_id,
            &ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }
}

fn lock(broker: &Mutex<Broker>) -> std::sync::MutexGuard<'_, Broker> {
    broker.lock().unwrap_or_else(PoisonError::into_inner)
}
