//! Companion HTTP surface.
//!
//! Two fixed documents, embedded at build time: an HTML landing page and the
//! JSON configuration returned to service discovery.

use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::utils::error::Result;

pub const INDEX_HTML: &str = include_str!("../../assets/index.html");
pub const EXTENSION_CONFIG: &str = include_str!("../../assets/extension.json");

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/register_service", get(register_service))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn register_service() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], EXTENSION_CONFIG).into_response()
}

/// Bind `addr` and serve until the listener fails. Port `0` picks a free port.
pub async fn start_http_server(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Web server started at http://{}", listener.local_addr()?);
    serve(listener).await
}

pub async fn serve(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
