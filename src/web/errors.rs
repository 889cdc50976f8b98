//! # Web API Errors
//!
//! Maps dispatch outcomes onto the status codes the evaluation client interprets.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::constants::defaults;
use crate::error::EvalError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    /// Every batch of the submission failed to launch
    #[error("{}", defaults::TOTAL_LAUNCH_FAILURE_MESSAGE)]
    TotalLaunchFailure,

    #[error("Internal Server Error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::TotalLaunchFailure | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EvalError> for ApiError {
    fn from(error: EvalError) -> Self {
        match error {
            EvalError::Validation(message) => Self::BadRequest { message },
            EvalError::TotalLaunchFailure { .. } => Self::TotalLaunchFailure,
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Plain text body, as the client surfaces it verbatim
            Self::Internal { .. } => (status, self.to_string()).into_response(),
            _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}
