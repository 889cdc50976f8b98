//! # Submission Handler
//!
//! `POST /v1/submissions`: decode a [`SubmissionPayload`], run the dispatcher and
//! answer with the [`LaunchSummary`].

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{debug, info};

use crate::logging::log_error;
use crate::models::{LaunchSummary, SubmissionPayload};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub async fn submit_batches(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<Json<LaunchSummary>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected malformed submission body");
        ApiError::bad_request(rejection.body_text())
    })?;

    info!(
        task_quantity = payload.task_quantity,
        metrics = ?payload.metrics,
        "Received evaluation submission"
    );

    let summary = state.dispatcher.dispatch(&payload).await.map_err(|e| {
        log_error(
            "submission_endpoint",
            "dispatch",
            &e.to_string(),
            Some(&format!("task_quantity={}", payload.task_quantity)),
        );
        ApiError::from(e)
    })?;

    info!(
        launched = summary.launched_count(),
        failed = summary.failed_task_count,
        "Submission dispatched"
    );
    Ok(Json(summary))
}
