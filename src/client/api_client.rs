//! # Evaluation API Client
//!
//! HTTP client for the submission and status endpoints, plus the transport-agnostic
//! [`EvaluationEndpoint`] trait the submitter and poller are written against.
//!
//! | Endpoint   | Status | Meaning                                   |
//! |------------|--------|-------------------------------------------|
//! | submission | 200    | accepted, body is the launch summary      |
//! | submission | other  | rejected, body text is diagnostic         |
//! | status     | 200    | complete, body is the final result object |
//! | status     | 400    | still running                             |
//! | status     | 500    | remote fatal error                        |
//! | status     | other  | unexpected, treated as fatal              |

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::ClientConfig;
use crate::constants::{defaults, status_codes};
use crate::error::{EvalError, Result};
use crate::models::{LaunchSummary, SubmissionPayload};

/// Classified answer of one status-endpoint round trip
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    Complete(serde_json::Value),
    Pending,
    RemoteError(String),
    Unexpected { status: u16, body: String },
}

impl StatusOutcome {
    pub fn from_response(status: u16, body: String) -> Result<Self> {
        Ok(match status {
            status_codes::COMPLETE => {
                let value = serde_json::from_str(&body).map_err(|e| {
                    EvalError::Transport(format!("malformed status response body: {e}"))
                })?;
                StatusOutcome::Complete(value)
            }
            status_codes::NOT_READY => StatusOutcome::Pending,
            status_codes::REMOTE_ERROR => StatusOutcome::RemoteError(body),
            status => StatusOutcome::Unexpected { status, body },
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusOutcome::Complete(_) => "complete",
            StatusOutcome::Pending => "pending",
            StatusOutcome::RemoteError(_) => "remote_error",
            StatusOutcome::Unexpected { .. } => "unexpected",
        }
    }
}

/// Common interface for the remote evaluation service regardless of transport
#[async_trait]
pub trait EvaluationEndpoint: Send + Sync {
    /// Post all batches; non-success responses are fatal and never retried
    async fn submit(&self, payload: &SubmissionPayload) -> Result<LaunchSummary>;

    /// Ask whether the job identified by `summary` has finished
    async fn check_status(&self, summary: &LaunchSummary) -> Result<StatusOutcome>;
}

#[derive(Clone)]
pub struct HttpEvaluationClient {
    client: Client,
    submission_url: Url,
    status_url: Url,
}

impl std::fmt::Debug for HttpEvaluationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEvaluationClient")
            .field("submission_url", &self.submission_url.as_str())
            .field("status_url", &self.status_url.as_str())
            .finish()
    }
}

impl HttpEvaluationClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let submission_url = Url::parse(&config.submission_url)
            .map_err(|e| EvalError::Configuration(format!("Invalid submission URL: {e}")))?;
        let status_url = Url::parse(&config.status_url)
            .map_err(|e| EvalError::Configuration(format!("Invalid status URL: {e}")))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref token) = config.auth_token {
            let header_name = if config.api_key_header.is_empty() {
                defaults::API_KEY_HEADER
            } else {
                &config.api_key_header
            };
            default_headers.insert(
                HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
                    EvalError::Configuration(format!("Invalid API key header name: {e}"))
                })?,
                HeaderValue::from_str(token)
                    .map_err(|e| EvalError::Configuration(format!("Invalid auth token: {e}")))?,
            );
            debug!("Configured API key authentication with header: {}", header_name);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("evalfleet-client/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| EvalError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            submission_url = %submission_url,
            status_url = %status_url,
            auth_enabled = config.auth_token.is_some(),
            "Created evaluation API client"
        );

        Ok(Self {
            client,
            submission_url,
            status_url,
        })
    }
}

#[async_trait]
impl EvaluationEndpoint for HttpEvaluationClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<LaunchSummary> {
        debug!(
            url = %self.submission_url,
            task_quantity = payload.task_quantity,
            "Submitting evaluation batches"
        );

        let response = self
            .client
            .post(self.submission_url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK {
            return serde_json::from_str(&body).map_err(|e| {
                EvalError::Transport(format!("malformed submission response body: {e}"))
            });
        }

        error!(status = %status, error = %body, "Submission rejected");

        if status.as_u16() == status_codes::REMOTE_ERROR && is_total_launch_failure(&body) {
            return Err(EvalError::TotalLaunchFailure {
                task_quantity: payload.task_quantity,
            });
        }
        Err(EvalError::submission_rejected(status.as_u16(), body))
    }

    async fn check_status(&self, summary: &LaunchSummary) -> Result<StatusOutcome> {
        let response = self
            .client
            .post(self.status_url.clone())
            .json(summary)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        StatusOutcome::from_response(status, body)
    }
}

fn is_total_launch_failure(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str().map(str::to_string)))
        .is_some_and(|message| message == defaults::TOTAL_LAUNCH_FAILURE_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            StatusOutcome::from_response(400, String::new()).unwrap(),
            StatusOutcome::Pending
        );
        assert_eq!(
            StatusOutcome::from_response(500, "worker crashed".into()).unwrap(),
            StatusOutcome::RemoteError("worker crashed".into())
        );
        assert_eq!(
            StatusOutcome::from_response(418, "teapot".into()).unwrap(),
            StatusOutcome::Unexpected {
                status: 418,
                body: "teapot".into()
            }
        );
        assert!(matches!(
            StatusOutcome::from_response(200, r#"{"faithfulness": 0.9}"#.into()).unwrap(),
            StatusOutcome::Complete(_)
        ));
    }

    #[test]
    fn test_malformed_complete_body_is_transport_error() {
        assert!(matches!(
            StatusOutcome::from_response(200, "<html>".into()),
            Err(EvalError::Transport(_))
        ));
    }

    #[test]
    fn test_total_launch_failure_body_detection() {
        assert!(is_total_launch_failure(r#"{"error": "Failed to start all tasks"}"#));
        assert!(!is_total_launch_failure("Internal Server Error: boom"));
    }

    #[test]
    fn test_invalid_urls_are_configuration_errors() {
        let config = ClientConfig {
            submission_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpEvaluationClient::new(&config),
            Err(EvalError::Configuration(_))
        ));
    }
}
