use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use trogon_bindings::BindingStore;

use crate::config::NotifyConfig;
use crate::events;
use crate::notifier::Notifier;
use crate::sender::OutboundSender;
use crate::signature;

#[derive(Clone)]
pub struct AppState<S, O> {
    notifier: Notifier<S, O>,
    webhook_secret: Arc<[u8]>,
    notify_timeout: Duration,
}

impl<S: BindingStore, O: OutboundSender> AppState<S, O> {
    pub fn new(notifier: Notifier<S, O>, webhook_secret: &str, notify_timeout: Duration) -> Self {
        Self {
            notifier,
            webhook_secret: Arc::from(webhook_secret.as_bytes()),
            notify_timeout,
        }
    }
}

/// Builds the HTTP router: `POST {webhook_path}` for GitHub and `GET /health`.
///
/// Other methods on the webhook path get 405 from axum's method router.
pub fn router<S: BindingStore, O: OutboundSender>(state: AppState<S, O>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handle_webhook::<S, O>))
        .route("/health", get(health))
        .with_state(state)
}

/// Starts the webhook HTTP server and runs it until Ctrl-C.
pub async fn serve<S: BindingStore, O: OutboundSender>(
    config: &NotifyConfig,
    store: S,
    sender: O,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if config.webhook_secret.is_empty() {
        warn!("GITHUB_WEBHOOK_SECRET is not set, every webhook will be rejected");
    }

    let state = AppState::new(
        Notifier::new(store, sender),
        &config.webhook_secret,
        config.notify_timeout,
    );
    let app = router(state, &config.webhook_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, path = %config.webhook_path, "GitHub webhook server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("GitHub webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[instrument(
    name = "github.webhook",
    skip_all,
    fields(
        event = tracing::field::Empty,
        delivery = tracing::field::Empty,
        recipient = tracing::field::Empty,
    )
)]
async fn handle_webhook<S: BindingStore, O: OutboundSender>(
    State(state): State<AppState<S, O>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let sig = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok());

    if let Err(e) = signature::verify(&state.webhook_secret, &body, sig) {
        warn!(reason = %e, "Rejected GitHub webhook");
        return StatusCode::UNAUTHORIZED;
    }

    let event = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let delivery = headers
        .get("x-github-delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let span = tracing::Span::current();
    span.record("event", event);
    span.record("delivery", delivery);

    let intent = match events::route(event, &body) {
        Ok(Some(intent)) => intent,
        Ok(None) => {
            debug!("GitHub webhook needs no notification");
            return StatusCode::OK;
        }
        Err(e) => {
            warn!(error = %e, "Malformed GitHub webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    span.record("recipient", intent.recipient_login.as_str());

    let deadline = Instant::now() + state.notify_timeout;
    if let Err(e) = state.notifier.dispatch(&intent, deadline).await {
        error!(error = %e, "Failed to dispatch notification");
    }

    StatusCode::OK
}
