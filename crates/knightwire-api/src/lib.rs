//! Knightwire relay server.
//!
//! Exposes the WebSocket relay at `/ws` plus health and session inspection
//! endpoints. The binary in `main.rs` wires configuration, telemetry, the
//! rules engine, and the dispatcher task around [`app`].

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod connection;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::play::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .layer(TraceLayer::new_for_http())
        // Browsers on any origin may open the relay socket.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
