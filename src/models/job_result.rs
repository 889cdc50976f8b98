//! JobResult
//!
//! Final evaluation outcome returned to the caller once the status endpoint reports completion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::evaluation_request::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Metric name to score averaged across all questions
    pub per_metric_averages: BTreeMap<String, f64>,
    /// One row per question with its individual metric scores
    pub per_question_scores: Vec<Record>,
    /// Report content split out of the raw result, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_artifact: Option<String>,
}

impl JobResult {
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.per_metric_averages.get(metric).copied()
    }
}
