//! # Evaluation Client
//!
//! Client-side half of the job protocol: submit, wait out the cold start, poll
//! until done and reconcile the final result.

pub mod aggregator;
pub mod api_client;
pub mod buffer;
pub mod evaluator;
pub mod poller;
pub mod submitter;

pub use aggregator::{FileReportSink, ReportSink, ResultAggregator};
pub use api_client::{EvaluationEndpoint, HttpEvaluationClient, StatusOutcome};
pub use buffer::{estimated_minutes, BufferTimeEstimator};
pub use evaluator::Evaluator;
pub use poller::{cancellable_sleep, CompletionPoller};
pub use submitter::JobSubmitter;
