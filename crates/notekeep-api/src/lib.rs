//! # notekeep-api
//!
//! HTTP API and operator console for notekeep.
//!
//! The binary in `main.rs` wires these pieces together: configuration from
//! the environment and command line, tracing, the JSON file store, the
//! console thread, and the axum server with graceful shutdown.

pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod handlers;
pub mod logging;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use notekeep_core::defaults;
use notekeep_store::Store;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Request ID generator using UUIDv7 (time-ordered).
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = notekeep_core::new_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    error!("handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": error::INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

/// Build the application router.
///
/// Note routes answer both with and without a trailing slash.
pub fn build_router(state: AppState) -> Router {
    use handlers::{notes, status};

    Router::new()
        // Liveness
        .route("/", get(status::liveness))
        .route("/api/v1/status", get(status::status))
        // Notes CRUD
        .route("/api/v1/notes/create", post(notes::create_note))
        .route("/api/v1/notes/create/", post(notes::create_note))
        .route("/api/v1/notes", get(notes::list_notes))
        .route("/api/v1/notes/", get(notes::list_notes))
        .route(
            "/api/v1/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/api/v1/notes/:id/",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state)
}

// =============================================================================
// SHUTDOWN
// =============================================================================

/// Process-wide shutdown signal.
///
/// Triggered by console `exit` or Ctrl-C; the server stops accepting
/// connections and drains in-flight requests once it fires.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once [`Shutdown::trigger`] has been called.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

/// Serve `router` on `listener` until `shutdown` fires, then drain.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: Shutdown,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.wait().await;
            info!("shutdown requested; draining connections");
        })
        .await
}
