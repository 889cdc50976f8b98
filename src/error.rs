//! # Error Types
//!
//! Structured error taxonomy for the submission, dispatch and polling phases.
//! Every fatal kind carries the remote diagnostic text verbatim so callers can
//! decide whether to exit, retry or report upstream.

use std::time::Duration;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Submission rejected (HTTP {status}): {message}")]
    SubmissionRejected { status: u16, message: String },

    #[error("Failed to start all {task_quantity} task(s)")]
    TotalLaunchFailure { task_quantity: usize },

    #[error("Status check failed (HTTP {status}): {message}")]
    PollFatal { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Poll deadline exceeded after {waited:?}")]
    DeadlineExceeded { waited: Duration },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn submission_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::SubmissionRejected {
            status,
            message: message.into(),
        }
    }

    pub fn poll_fatal(status: u16, message: impl Into<String>) -> Self {
        Self::PollFatal {
            status,
            message: message.into(),
        }
    }

    /// Only network-level failures are worth retrying, and only inside the poll loop.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EvalError::Transport(_))
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for EvalError {
    fn from(err: config::ConfigError) -> Self {
        EvalError::Configuration(err.to_string())
    }
}
