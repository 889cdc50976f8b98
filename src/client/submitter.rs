//! # Job Submitter
//!
//! Posts every encoded batch plus the metric set in one request and interprets the
//! immediate accept/reject answer. Rejections are fatal; nothing is retried, since
//! a resubmission could launch a second fleet of workers.

use std::sync::Arc;
use tracing::{info, warn};

use super::api_client::EvaluationEndpoint;
use crate::error::{EvalError, Result};
use crate::models::{Batch, LaunchSummary, SubmissionPayload};

#[derive(Clone)]
pub struct JobSubmitter {
    endpoint: Arc<dyn EvaluationEndpoint>,
}

impl JobSubmitter {
    pub fn new(endpoint: Arc<dyn EvaluationEndpoint>) -> Self {
        Self { endpoint }
    }

    pub async fn submit(&self, batches: &[Batch], metrics: &[String]) -> Result<LaunchSummary> {
        if batches.is_empty() {
            return Err(EvalError::validation("nothing to submit: no batches"));
        }
        if metrics.is_empty() {
            return Err(EvalError::validation("at least one metric is required"));
        }

        let payload = SubmissionPayload::from_batches(batches, metrics);
        let summary = self.endpoint.submit(&payload).await?;

        if summary.result_versions.len() != payload.task_quantity {
            return Err(EvalError::Transport(format!(
                "submission response lists {} result version(s) for {} task(s)",
                summary.result_versions.len(),
                payload.task_quantity
            )));
        }
        if summary.is_total_failure() {
            return Err(EvalError::TotalLaunchFailure {
                task_quantity: payload.task_quantity,
            });
        }

        info!("Nodes successfully created, beginning process now");
        if payload.task_quantity > 1 {
            info!(
                task_quantity = payload.task_quantity,
                "Running: {} concurrent tasks. This may take a few minutes", payload.task_quantity
            );
        }
        if summary.is_partial_failure() {
            warn!(
                failed_tasks = summary.failed_task_count,
                "Failed to start {} task(s)", summary.failed_task_count
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batching::BatchSplitter;
    use crate::models::Record;
    use crate::testing::ScriptedEndpoint;
    use serde_json::json;

    fn batches(rows: usize, max: usize) -> Vec<Batch> {
        let data: Vec<Record> = (0..rows)
            .map(|i| json!({ "id": i }).as_object().unwrap().clone())
            .collect();
        BatchSplitter::new(max).unwrap().split(&data).unwrap()
    }

    #[tokio::test]
    async fn test_payload_carries_every_batch() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(3));
        let submitter = JobSubmitter::new(endpoint.clone());
        let metrics = vec!["faithfulness".to_string()];

        let summary = submitter.submit(&batches(25, 10), &metrics).await.unwrap();
        assert_eq!(summary.task_quantity, 3);

        let submitted = endpoint.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].task_quantity, 3);
        assert_eq!(submitted[0].encoded_batches.len(), 3);
        assert_eq!(submitted[0].metrics, metrics);
    }

    #[tokio::test]
    async fn test_rejection_is_fatal_and_not_retried() {
        let endpoint = Arc::new(ScriptedEndpoint::rejecting(403, "Forbidden"));
        let submitter = JobSubmitter::new(endpoint.clone());

        let err = submitter
            .submit(&batches(5, 10), &["faithfulness".to_string()])
            .await
            .unwrap_err();
        match err {
            EvalError::SubmissionRejected { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden");
            }
            other => panic!("expected SubmissionRejected, got {other:?}"),
        }
        assert_eq!(endpoint.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_metrics_rejected_before_sending() {
        let endpoint = Arc::new(ScriptedEndpoint::accepting(1));
        let submitter = JobSubmitter::new(endpoint.clone());

        assert!(submitter.submit(&batches(5, 10), &[]).await.is_err());
        assert!(endpoint.submissions().is_empty());
    }
}
