//! Webhook HTTP server.
//!
//! Telegram POSTs each update to `/{token}`; any other path segment is
//! answered with 404 so the endpoint cannot be probed without the token.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::commands::CommandHandler;
use crate::telegram::Update;

/// Body returned by the health check.
pub const HEALTH_BODY: &str = "Bot is running";

#[derive(Clone)]
struct WebhookState {
    handler: Arc<CommandHandler>,
    token: Arc<str>,
    /// Serializes update processing.
    serial: Arc<Mutex<()>>,
}

/// Builds the webhook router: `POST /{token}` and `GET /health`.
pub fn router(handler: Arc<CommandHandler>, token: &str) -> Router {
    let state = WebhookState {
        handler,
        token: Arc::from(token),
        serial: Arc::new(Mutex::new(())),
    };

    Router::new()
        .route("/health", get(health))
        .route("/{token}", post(receive_update))
        .with_state(state)
}

async fn health() -> &'static str {
    HEALTH_BODY
}

async fn receive_update(
    State(state): State<WebhookState>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    if token != *state.token {
        debug!("Rejecting webhook call on an unknown path");
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Malformed update payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let _guard = state.serial.lock().await;
    state.handler.handle_update(update).await;
    StatusCode::OK
}

/// Serves the webhook on `0.0.0.0:port` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(
    handler: Arc<CommandHandler>,
    token: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", addr);

    axum::serve(listener, router(handler, token))
        .with_graceful_shutdown(shutdown)
        .await
}
