//! # Route Definitions

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Routes mounted under `/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new().route("/submissions", post(handlers::submissions::submit_batches))
}

/// Unauthenticated probes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::basic_health))
}
