//! # Structured Logging Module
//!
//! Environment-aware structured logging for the client and the submission endpoint.

use chrono::Utc;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json_output = std::env::var("EVALFLEET_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console_layer = if json_output {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already be installed by an embedding process
        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            json_output = json_output,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("EVALFLEET_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for batch splitting and encoding
pub fn log_batch_operation(operation: &str, batch_index: usize, row_count: usize, bytes: usize) {
    tracing::debug!(
        operation = %operation,
        batch_index = batch_index,
        row_count = row_count,
        bytes = bytes,
        timestamp = %Utc::now().to_rfc3339(),
        "BATCH_OPERATION"
    );
}

/// Log structured data for a worker launch attempt
pub fn log_launch_operation(
    batch_index: usize,
    result_version: Uuid,
    launch_handle: Option<&str>,
    object_uri: &str,
) {
    match launch_handle {
        Some(handle) => tracing::info!(
            batch_index = batch_index,
            result_version = %result_version,
            launch_handle = %handle,
            object_uri = %object_uri,
            "Task started successfully"
        ),
        None => tracing::warn!(
            batch_index = batch_index,
            result_version = %result_version,
            object_uri = %object_uri,
            "Failed to start task"
        ),
    }
}

/// Log a single status-endpoint round trip
pub fn log_poll_attempt(attempt: u32, status: Option<u16>, outcome: &str) {
    tracing::debug!(
        attempt = attempt,
        status = status,
        outcome = %outcome,
        timestamp = %Utc::now().to_rfc3339(),
        "POLL_ATTEMPT"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
        assert!(LOGGER_INITIALIZED.get().is_some());
    }
}
