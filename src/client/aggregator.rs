//! # Result Aggregator
//!
//! Splits the status endpoint's final object into per-metric averages, the
//! per-question table and the optional report artifact, and persists the artifact
//! through a [`ReportSink`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::result_keys;
use crate::error::{EvalError, Result};
use crate::models::{JobResult, Record};

pub struct ResultAggregator;

impl ResultAggregator {
    /// Numeric top-level values are metric averages, `details` rows form the
    /// per-question table and `HTML` is lifted out as the report artifact.
    pub fn aggregate(raw: serde_json::Value) -> Result<JobResult> {
        let serde_json::Value::Object(mut object) = raw else {
            return Err(EvalError::Transport(
                "final result is not a JSON object".to_string(),
            ));
        };

        let report_artifact = match object.remove(result_keys::REPORT_ARTIFACT) {
            Some(serde_json::Value::String(html)) => Some(html),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        let per_question_scores = match object.remove(result_keys::DETAILS) {
            Some(serde_json::Value::Array(rows)) => rows
                .into_iter()
                .map(|row| match row {
                    serde_json::Value::Object(record) => Ok(record),
                    other => Err(EvalError::Transport(format!(
                        "detail row is not an object: {other}"
                    ))),
                })
                .collect::<Result<Vec<Record>>>()?,
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(EvalError::Transport(format!(
                    "'{}' must be an array, got {other}",
                    result_keys::DETAILS
                )))
            }
        };

        let mut per_metric_averages = BTreeMap::new();
        for (key, value) in object {
            match value.as_f64() {
                Some(score) => {
                    per_metric_averages.insert(key, score);
                }
                None => debug!(key = %key, "Ignoring non-numeric result field"),
            }
        }

        Ok(JobResult {
            per_metric_averages,
            per_question_scores,
            report_artifact,
        })
    }
}

/// Destination for the extracted report
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Replace any previously persisted report with `content`
    async fn persist(&self, content: &str) -> Result<()>;
}

/// Writes the report to a fixed path, replacing the previous run's file
#[derive(Debug, Clone)]
pub struct FileReportSink {
    path: PathBuf,
}

impl FileReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn persist(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        info!(path = %self.path.display(), bytes = content.len(), "Report written");
        Ok(())
    }
}
