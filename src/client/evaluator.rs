//! # Evaluator
//!
//! End-to-end client flow for one evaluation run:
//!
//! ```text
//! rows ─▶ split ─▶ submit ─▶ cold-start sleep ─▶ poll ─▶ aggregate ─▶ report sink
//! ```
//!
//! Every fatal condition comes back as an `EvalError`; nothing here exits the process.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::aggregator::{FileReportSink, ReportSink, ResultAggregator};
use super::api_client::{EvaluationEndpoint, HttpEvaluationClient};
use super::buffer::{estimated_minutes, BufferTimeEstimator};
use super::poller::{cancellable_sleep, CompletionPoller};
use super::submitter::JobSubmitter;
use crate::batching::BatchSplitter;
use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::models::{EvaluationRequest, JobResult};

pub struct Evaluator {
    submitter: JobSubmitter,
    estimator: BufferTimeEstimator,
    poller: CompletionPoller,
    sink: Arc<dyn ReportSink>,
}

impl Evaluator {
    pub fn new(
        endpoint: Arc<dyn EvaluationEndpoint>,
        sink: Arc<dyn ReportSink>,
        config: &EvalConfig,
    ) -> Self {
        Self {
            submitter: JobSubmitter::new(endpoint.clone()),
            estimator: BufferTimeEstimator::new(config.buffer.clone()),
            poller: CompletionPoller::new(endpoint, &config.polling),
            sink,
        }
    }

    /// HTTP endpoints and a file report sink, as described by `config`
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        let endpoint = Arc::new(HttpEvaluationClient::new(&config.client)?);
        let sink = Arc::new(FileReportSink::new(config.report.output_path.clone()));
        Ok(Self::new(endpoint, sink, config))
    }

    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
        cancel: &CancellationToken,
    ) -> Result<JobResult> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(EvalError::Cancelled);
        }

        info!(
            rows = request.question_count(),
            metrics = ?request.metrics,
            max_batch_size = request.max_batch_size,
            "Preparing nodes for evaluation"
        );
        let batches = BatchSplitter::new(request.max_batch_size)?.split(&request.rows)?;

        let summary = self.submitter.submit(&batches, &request.metrics).await?;

        let buffer = self.estimator.estimate_seconds(
            request.question_count(),
            &request.metrics,
            summary.task_quantity,
        )?;
        info!(
            estimated_seconds = buffer,
            "Evaluation in progress. Estimated time to completion: {} minutes",
            estimated_minutes(buffer)
        );
        cancellable_sleep(std::time::Duration::from_secs(buffer), cancel).await?;

        let raw = self.poller.poll(&summary, cancel).await?;
        let result = ResultAggregator::aggregate(raw)?;

        if let Some(ref report) = result.report_artifact {
            self.sink.persist(report).await?;
            info!("Refer to the generated report card for a detailed analysis");
        }

        info!(
            scores = ?result.per_metric_averages,
            questions = result.per_question_scores.len(),
            "Evaluation completed successfully"
        );
        Ok(result)
    }
}
