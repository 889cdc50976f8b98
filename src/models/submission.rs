//! SubmissionPayload
//!
//! Body posted to the submission endpoint: `{file_batch, task_quantity, metrics}`.

use serde::{Deserialize, Serialize};

use super::batch::Batch;
use crate::error::{EvalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "file_batch")]
    pub encoded_batches: Vec<String>,
    pub task_quantity: usize,
    pub metrics: Vec<String>,
}

impl SubmissionPayload {
    pub fn from_batches(batches: &[Batch], metrics: &[String]) -> Self {
        Self {
            encoded_batches: batches.iter().map(|b| b.encoded_content.clone()).collect(),
            task_quantity: batches.len(),
            metrics: metrics.to_vec(),
        }
    }

    /// Structural checks applied by the endpoint before any worker is launched
    pub fn validate(&self) -> Result<()> {
        if self.encoded_batches.is_empty() {
            return Err(EvalError::validation("file_batch must contain at least one batch"));
        }
        if self.task_quantity != self.encoded_batches.len() {
            return Err(EvalError::validation(format!(
                "task_quantity {} does not match {} submitted batch(es)",
                self.task_quantity,
                self.encoded_batches.len()
            )));
        }
        if self.metrics.is_empty() {
            return Err(EvalError::validation("at least one metric is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let payload = SubmissionPayload {
            encoded_batches: vec!["YQ==".to_string()],
            task_quantity: 1,
            metrics: vec!["faithfulness".to_string()],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["file_batch"][0], "YQ==");
        assert_eq!(value["task_quantity"], 1);
        assert_eq!(value["metrics"][0], "faithfulness");
    }

    #[test]
    fn test_mismatched_task_quantity_is_rejected() {
        let payload = SubmissionPayload {
            encoded_batches: vec!["YQ==".to_string(), "Yg==".to_string()],
            task_quantity: 3,
            metrics: vec!["faithfulness".to_string()],
        };
        assert!(matches!(payload.validate(), Err(EvalError::Validation(_))));
    }
}
