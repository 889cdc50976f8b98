//! # Completion Poller
//!
//! Caller-driven loop against the status endpoint: `Polling → Done | Fatal`.
//!
//! - `Complete` ends the loop with the result payload.
//! - `Pending` sleeps `refresh_rate` and polls again, with no retry cap.
//! - A remote error or any unrecognised status is fatal and never retried.
//! - Transport failures are retried after `refresh_rate` up to
//!   `max_transport_retries` consecutive times, then fatal.
//!
//! The cancellation token is checked before every poll and every sleep and raced
//! against each sleep. An optional deadline bounds the whole poll phase.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::api_client::{EvaluationEndpoint, StatusOutcome};
use crate::config::PollingConfig;
use crate::constants::PollState;
use crate::error::{EvalError, Result};
use crate::logging::log_poll_attempt;
use crate::models::LaunchSummary;

/// Sleep for `delay` unless `cancel` fires first
pub async fn cancellable_sleep(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(EvalError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

#[derive(Clone)]
pub struct CompletionPoller {
    endpoint: Arc<dyn EvaluationEndpoint>,
    refresh_rate: Duration,
    refresh_message: bool,
    max_transport_retries: u32,
    deadline: Option<Duration>,
}

impl CompletionPoller {
    pub fn new(endpoint: Arc<dyn EvaluationEndpoint>, config: &PollingConfig) -> Self {
        Self {
            endpoint,
            refresh_rate: config.refresh_rate(),
            refresh_message: config.refresh_message,
            max_transport_retries: config.max_transport_retries,
            deadline: config.deadline(),
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Poll until the job completes, fails, is cancelled or runs past the deadline
    pub async fn poll(
        &self,
        summary: &LaunchSummary,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value> {
        let started = Instant::now();
        let deadline_at = self.deadline.map(|d| started + d);
        let mut attempt: u32 = 0;
        let mut transport_failures: u32 = 0;

        loop {
            self.check_interrupted(cancel, deadline_at, started)?;
            attempt += 1;

            match self.endpoint.check_status(summary).await {
                Ok(StatusOutcome::Complete(payload)) => {
                    log_poll_attempt(attempt, Some(200), "complete");
                    debug!(state = %PollState::Done, attempts = attempt, "Evaluation job complete");
                    return Ok(payload);
                }
                Ok(StatusOutcome::Pending) => {
                    log_poll_attempt(attempt, Some(400), "pending");
                    transport_failures = 0;
                    if self.refresh_message {
                        info!(
                            "Evaluation job still running. Next status check in {}s...",
                            self.refresh_rate.as_secs()
                        );
                    } else {
                        debug!(attempt = attempt, state = %PollState::Polling, "Evaluation job still running");
                    }
                }
                Ok(StatusOutcome::RemoteError(message)) => {
                    log_poll_attempt(attempt, Some(500), "remote_error");
                    warn!(state = %PollState::Fatal, error = %message, "Status endpoint reported an error");
                    return Err(EvalError::poll_fatal(500, message));
                }
                Ok(StatusOutcome::Unexpected { status, body }) => {
                    log_poll_attempt(attempt, Some(status), "unexpected");
                    warn!(state = %PollState::Fatal, status = status, "Unexpected status code");
                    return Err(EvalError::poll_fatal(status, body));
                }
                Err(e) if e.is_recoverable() && transport_failures < self.max_transport_retries => {
                    transport_failures += 1;
                    log_poll_attempt(attempt, None, "transport_error");
                    warn!(
                        error = %e,
                        consecutive_failures = transport_failures,
                        max_retries = self.max_transport_retries,
                        "Status check failed in transit; retrying"
                    );
                }
                Err(e) => {
                    warn!(state = %PollState::Fatal, error = %e, "Status check failed");
                    return Err(e);
                }
            }

            self.check_interrupted(cancel, deadline_at, started)?;
            self.pause(cancel, deadline_at, started).await?;
        }
    }

    fn check_interrupted(
        &self,
        cancel: &CancellationToken,
        deadline_at: Option<Instant>,
        started: Instant,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(EvalError::Cancelled);
        }
        if deadline_at.is_some_and(|at| Instant::now() >= at) {
            return Err(EvalError::DeadlineExceeded {
                waited: started.elapsed(),
            });
        }
        Ok(())
    }

    async fn pause(
        &self,
        cancel: &CancellationToken,
        deadline_at: Option<Instant>,
        started: Instant,
    ) -> Result<()> {
        let wake_at = Instant::now() + self.refresh_rate;
        match deadline_at {
            Some(at) if at < wake_at => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(EvalError::Cancelled),
                    _ = tokio::time::sleep_until(at) => Err(EvalError::DeadlineExceeded {
                        waited: started.elapsed(),
                    }),
                }
            }
            _ => cancellable_sleep(self.refresh_rate, cancel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedEndpoint, StatusStep};
    use serde_json::json;

    fn poller(endpoint: Arc<ScriptedEndpoint>) -> CompletionPoller {
        CompletionPoller::new(endpoint, &PollingConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_pending_then_complete() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1).with_statuses([
            StatusStep::status(400, ""),
            StatusStep::status(400, ""),
            StatusStep::status(200, r#"{"faithfulness": 0.8}"#),
        ]));
        let started = Instant::now();

        let payload = poller(endpoint.clone())
            .poll(&endpoint.summary(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(payload, json!({"faithfulness": 0.8}));
        assert_eq!(endpoint.status_calls(), 3);
        // Exactly two refresh-rate sleeps
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(20) && waited < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_stops_polling() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1).with_statuses([
            StatusStep::status(400, ""),
            StatusStep::status(500, "worker crashed"),
            StatusStep::status(200, "{}"),
        ]));

        let err = poller(endpoint.clone())
            .poll(&endpoint.summary(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::PollFatal { status: 500, ref message } if message == "worker crashed"));
        assert_eq!(endpoint.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_retry_then_give_up() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1).with_statuses([
            StatusStep::transport("connection reset"),
            StatusStep::status(400, ""),
            StatusStep::transport("connection reset"),
            StatusStep::transport("connection reset"),
            StatusStep::transport("connection reset"),
            StatusStep::transport("connection reset"),
        ]));

        let err = poller(endpoint.clone())
            .poll(&endpoint.summary(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::Transport(_)));
        // One recovered failure, a pending reset, then three retries before the fatal fourth
        assert_eq!(endpoint.status_calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_before_first_poll() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(endpoint.clone())
            .poll(&endpoint.summary(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::Cancelled));
        assert_eq!(endpoint.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let endpoint = Arc::new(
            ScriptedEndpoint::accepting(1).with_statuses([StatusStep::status(400, "")]),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let err = poller(endpoint.clone())
            .poll(&endpoint.summary(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::Cancelled));
        assert_eq!(endpoint.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_pending_loop() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1).with_statuses(
            std::iter::repeat_with(|| StatusStep::status(400, "")).take(100),
        ));

        let err = poller(endpoint.clone())
            .with_deadline(Some(Duration::from_secs(25)))
            .poll(&endpoint.summary(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::DeadlineExceeded { .. }));
        // Polls at t=0, 10 and 20; the deadline lands during the third sleep
        assert_eq!(endpoint.status_calls(), 3);
    }
}
