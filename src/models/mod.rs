//! # Models
//!
//! Domain and wire types shared by the evaluation client and the dispatcher.

pub mod batch;
pub mod evaluation_request;
pub mod job_result;
pub mod launch;
pub mod submission;

pub use batch::Batch;
pub use evaluation_request::{parse_records, EvaluationRequest, Record};
pub use job_result::JobResult;
pub use launch::{LaunchSummary, ResultVersion, TaskRecord};
pub use submission::SubmissionPayload;
