//! EvaluationRequest
//!
//! The caller-built description of one evaluation run: the ordered dataset, the
//! metric set to compute and the maximum number of rows handed to one worker.

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::{EvalError, Result};

/// One row of the tabular dataset, keyed by column name
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub rows: Vec<Record>,
    /// Unique metric names in first-seen order
    pub metrics: Vec<String>,
    pub max_batch_size: usize,
}

impl EvaluationRequest {
    /// Build a request using the default batch size (a single worker for most datasets)
    pub fn new(rows: Vec<Record>, metrics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for metric in metrics {
            let metric = metric.into();
            if !unique.contains(&metric) {
                unique.push(metric);
            }
        }

        Self {
            rows,
            metrics: unique,
            max_batch_size: defaults::MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn question_count(&self) -> usize {
        self.rows.len()
    }

    /// Empty datasets and empty metric sets are rejected rather than treated as a silent success
    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(EvalError::validation("dataset contains no rows"));
        }
        if self.metrics.is_empty() {
            return Err(EvalError::validation("at least one metric is required"));
        }
        if self.metrics.iter().any(|m| m.trim().is_empty()) {
            return Err(EvalError::validation("metric names must not be blank"));
        }
        if self.max_batch_size < 1 {
            return Err(EvalError::validation("max_batch_size must be at least 1"));
        }
        Ok(())
    }
}

/// Parse a dataset given either as a JSON array of objects or as JSON Lines
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, value)| into_record(value, i + 1))
            .collect();
    }

    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| into_record(serde_json::from_str(line)?, i + 1))
        .collect()
}

fn into_record(value: serde_json::Value, position: usize) -> Result<Record> {
    match value {
        serde_json::Value::Object(record) => Ok(record),
        other => Err(EvalError::validation(format!(
            "row {position} is not a JSON object: {other}"
        ))),
    }
}
