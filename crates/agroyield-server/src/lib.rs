//! Axum router and shared state for the agroyield prediction API.
//!
//! The binary in `main.rs` loads the model and binds the listener; the
//! router itself is built here so integration tests can drive it without a
//! socket.
//!
//! Routes:
//!
//! - `GET /` — status plus the loaded artifact path
//! - `GET /health` — plain liveness probe
//! - `POST /predict` — one validated row in, one prediction out

pub mod dto;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use agroyield_core::Pipeline;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server state accessible from all handlers.
///
/// The pipeline is loaded once at boot and never mutated, so handlers only
/// ever take shared references.
pub struct ServerState {
    pub pipeline: Pipeline,
    pub model_path: String,
}

/// Builds the application router with CORS and request tracing applied.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/", get(handlers::status::status))
        .route("/predict", post(handlers::predict::predict))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
