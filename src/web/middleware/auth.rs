//! # API Key Authentication
//!
//! When `web.api_key` is configured every protected request must carry it in the
//! configured header (default `x-api-key`).

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.api_key.as_deref() else {
        debug!("No API key configured - allowing request");
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(state.config.api_key_header.as_str())
        .and_then(|value| value.to_str().ok());

    if !key_matches(provided, expected) {
        warn!(
            header = %state.config.api_key_header,
            present = provided.is_some(),
            "Rejected request with missing or invalid API key"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

fn key_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(key) => {
            key.len() == expected.len()
                && key
                    .bytes()
                    .zip(expected.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        None => false,
    }
}
