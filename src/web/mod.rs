//! # Submission Endpoint
//!
//! Axum application hosting the dispatcher behind `POST /v1/submissions`.
//!
//! ## Core Components
//!
//! - [`routes`] - route groups
//! - [`handlers`] - submission and health handlers
//! - [`middleware`] - API-key authentication
//! - [`state`] - shared dispatcher and web configuration
//! - [`errors`] - HTTP mapping of dispatch failures

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use errors::ApiError;
pub use state::AppState;

/// Build the router: public health routes plus the API-key protected `/v1` group
pub fn create_app(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .nest("/v1", routes::api_v1_routes())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .merge(routes::health_routes())
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
