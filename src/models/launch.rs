//! Launch bookkeeping
//!
//! `ResultVersion` correlates a persisted batch object, its launched worker and its
//! eventual results. `TaskRecord` lives only for one dispatch call; `LaunchSummary`
//! is what the submission endpoint returns and what the status endpoint is polled with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Randomly generated 128-bit identifier minted once per batch at dispatch time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultVersion(Uuid);

impl ResultVersion {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ResultVersion {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ResultVersion {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ResultVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one batch's launch attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub batch_index: usize,
    pub result_version: ResultVersion,
    pub object_key: String,
    /// Present when a running task was created, absent on launch failure
    pub launch_handle: Option<String>,
    pub dispatched_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn launched(&self) -> bool {
        self.launch_handle.is_some()
    }
}

/// Wire form: `{failed_tasks, task_arns, result_versions, task_quantity}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSummary {
    #[serde(rename = "failed_tasks")]
    pub failed_task_count: usize,
    /// Aligned with batch index; `None` marks a failed slot
    #[serde(rename = "task_arns")]
    pub launch_handles: Vec<Option<String>>,
    /// Aligned 1:1 with batches, including batches whose launch failed
    pub result_versions: Vec<ResultVersion>,
    pub task_quantity: usize,
}

impl LaunchSummary {
    /// Summarize index-ordered task records
    pub fn from_records(records: &[TaskRecord], task_quantity: usize) -> Self {
        let failed_task_count = records.iter().filter(|r| !r.launched()).count();
        Self {
            failed_task_count,
            launch_handles: records.iter().map(|r| r.launch_handle.clone()).collect(),
            result_versions: records.iter().map(|r| r.result_version).collect(),
            task_quantity,
        }
    }

    pub fn launched_count(&self) -> usize {
        self.task_quantity.saturating_sub(self.failed_task_count)
    }

    pub fn is_total_failure(&self) -> bool {
        self.failed_task_count == self.task_quantity
    }

    /// Some but not all batches failed to launch; the job proceeds with the rest
    pub fn is_partial_failure(&self) -> bool {
        self.failed_task_count > 0 && !self.is_total_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, handle: Option<&str>) -> TaskRecord {
        TaskRecord {
            batch_index: index,
            result_version: ResultVersion::new(),
            object_key: format!("files/file-{index}.env"),
            launch_handle: handle.map(str::to_string),
            dispatched_at: Utc::now(),
        }
    }

    #[test]
    fn test_partial_failure_keeps_alignment() {
        let records = vec![record(0, None), record(1, Some("task/2"))];
        let summary = LaunchSummary::from_records(&records, 2);

        assert_eq!(summary.failed_task_count, 1);
        assert_eq!(summary.launch_handles, vec![None, Some("task/2".to_string())]);
        assert_eq!(summary.result_versions.len(), 2);
        assert_eq!(summary.result_versions[0], records[0].result_version);
        assert!(summary.is_partial_failure());
        assert!(!summary.is_total_failure());
        assert_eq!(summary.launched_count(), 1);
    }

    #[test]
    fn test_wire_form_uses_null_for_failed_slots() {
        let records = vec![record(0, None), record(1, Some("task/2"))];
        let summary = LaunchSummary::from_records(&records, 2);
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["failed_tasks"], 1);
        assert!(value["task_arns"][0].is_null());
        assert_eq!(value["task_arns"][1], "task/2");
        assert_eq!(value["task_quantity"], 2);
        assert_eq!(
            value["result_versions"][0],
            records[0].result_version.to_string()
        );
    }

    #[test]
    fn test_total_failure() {
        let records = vec![record(0, None), record(1, None)];
        let summary = LaunchSummary::from_records(&records, 2);
        assert!(summary.is_total_failure());
        assert!(!summary.is_partial_failure());
    }
}
