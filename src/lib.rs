#![allow(clippy::doc_markdown)] // Allow technical terms like JSON, UUID in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Evalfleet Core
//!
//! Batch evaluation job orchestration: a client splits a dataset into batches,
//! submits them to a dispatcher that fans each batch out to a containerised
//! worker, waits out the cold start, polls for completion and reconciles the
//! per-metric scores and report.
//!
//! ## Module Organization
//!
//! - [`batching`] - row splitting, base64 batch encoding and transport chunking
//! - [`client`] - submission, buffer estimation, completion polling, aggregation
//! - [`orchestration`] - env blocks, object storage and task launching per batch
//! - [`web`] - the submission endpoint hosting the dispatcher
//! - [`models`] - wire and domain types shared by both sides
//! - [`config`] - layered configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evalfleet_core::client::Evaluator;
//! use evalfleet_core::config::ConfigManager;
//! use evalfleet_core::models::EvaluationRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(rows: Vec<evalfleet_core::models::Record>) -> evalfleet_core::Result<()> {
//! let manager = ConfigManager::load(None)?;
//! let evaluator = Evaluator::from_config(manager.config())?;
//! let request = EvaluationRequest::new(rows, ["faithfulness", "answer_relevancy"]);
//! let result = evaluator.evaluate(&request, &CancellationToken::new()).await?;
//! println!("{:?}", result.per_metric_averages);
//! # Ok(())
//! # }
//! ```

pub mod batching;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod testing;
pub mod web;

pub use batching::BatchSplitter;
pub use client::{BufferTimeEstimator, CompletionPoller, Evaluator, JobSubmitter, ResultAggregator};
pub use config::{ConfigManager, EvalConfig};
pub use error::{EvalError, Result};
pub use models::{
    Batch, EvaluationRequest, JobResult, LaunchSummary, Record, ResultVersion, SubmissionPayload,
};
pub use orchestration::{EnvBlock, TaskDispatcher};
