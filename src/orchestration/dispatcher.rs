//! # Task Dispatcher
//!
//! Runs once per submission inside the submission endpoint. For every batch it
//! mints a result version, persists the batch's environment block and asks the
//! launcher for a worker that reads it.
//!
//! ## Failure accounting
//!
//! - A launch that starts no task leaves that batch's handle empty and is counted;
//!   the remaining batches are still attempted.
//! - Every batch keeps its result version, launched or not, aligned by index.
//! - When every batch failed to launch the dispatch reports `TotalLaunchFailure`.
//! - Storage or launch-service errors abort the dispatch as a server-side fatal error.
//!
//! The failure count is derived from this call's own records, so concurrent
//! submissions never share counters. Launches run with bounded concurrency
//! (`launch_concurrency`, 1 = sequential); results are collected in batch order.

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::env_block::EnvBlock;
use super::launcher::{LaunchRequest, TaskLauncher};
use super::storage::{object_key, ObjectStore};
use crate::config::DispatcherConfig;
use crate::constants::defaults;
use crate::error::{EvalError, Result};
use crate::logging::log_launch_operation;
use crate::models::{LaunchSummary, ResultVersion, SubmissionPayload, TaskRecord};

#[derive(Clone)]
pub struct TaskDispatcher {
    store: Arc<dyn ObjectStore>,
    launcher: Arc<dyn TaskLauncher>,
    config: DispatcherConfig,
}

impl std::fmt::Debug for TaskDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDispatcher")
            .field("max_transport_bytes", &self.config.max_transport_bytes)
            .field("launch_concurrency", &self.config.launch_concurrency)
            .field("folder_name", &self.config.folder_name)
            .finish()
    }
}

impl TaskDispatcher {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        launcher: Arc<dyn TaskLauncher>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            launcher,
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Persist and launch every batch of `payload`
    pub async fn dispatch(&self, payload: &SubmissionPayload) -> Result<LaunchSummary> {
        payload.validate()?;
        let task_quantity = payload.task_quantity;

        info!(
            task_quantity = task_quantity,
            metrics = ?payload.metrics,
            launch_concurrency = self.config.launch_concurrency,
            "Dispatching evaluation batches"
        );

        let metrics = payload.metrics.as_slice();
        let records: Vec<TaskRecord> = stream::iter(payload.encoded_batches.iter().cloned().enumerate())
            .map(|(index, encoded)| async move {
                self.dispatch_batch(index, &encoded, metrics).await
            })
            .buffered(self.config.launch_concurrency.max(1))
            .try_collect()
            .await
            .inspect_err(|e| error!(error = %e, "Dispatch aborted"))?;

        let summary = LaunchSummary::from_records(&records, task_quantity);

        if summary.is_total_failure() {
            error!(
                task_quantity = task_quantity,
                result_versions = ?summary.result_versions,
                "Failed to start all tasks"
            );
            return Err(EvalError::TotalLaunchFailure { task_quantity });
        }

        if summary.is_partial_failure() {
            warn!(
                failed_tasks = summary.failed_task_count,
                task_quantity = task_quantity,
                "Some tasks failed to start; continuing with the launched subset"
            );
        }

        info!(
            launched = summary.launched_count(),
            task_quantity = task_quantity,
            "Dispatch complete"
        );
        Ok(summary)
    }

    async fn dispatch_batch(
        &self,
        index: usize,
        encoded: &str,
        metrics: &[String],
    ) -> Result<TaskRecord> {
        let result_version = ResultVersion::new();
        let block = EnvBlock::build(
            metrics,
            result_version,
            encoded,
            self.config.max_transport_bytes,
        )?;

        let key = object_key(&self.config.folder_name, result_version);
        self.store
            .put_object(&key, block.render()?, defaults::ENV_FILE_CONTENT_TYPE)
            .await?;

        let object_uri = self.store.object_uri(&key);
        let request = LaunchRequest::from_config(&self.config, result_version, object_uri.clone());
        let launch_handle = self.launcher.launch(&request).await?;

        log_launch_operation(
            index,
            result_version.as_uuid(),
            launch_handle.as_deref(),
            &object_uri,
        );

        Ok(TaskRecord {
            batch_index: index,
            result_version,
            object_key: key,
            launch_handle,
            dispatched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryObjectStore, ScriptedLauncher};

    fn payload(batches: usize) -> SubmissionPayload {
        SubmissionPayload {
            encoded_batches: (0..batches).map(|i| format!("YmF0Y2g{i}")).collect(),
            task_quantity: batches,
            metrics: vec!["faithfulness".to_string()],
        }
    }

    fn assert_send<F: std::future::Future + Send>(_: F) {}

    async fn dispatch_owned(
        dispatcher: Arc<TaskDispatcher>,
        payload: SubmissionPayload,
    ) -> Result<LaunchSummary> {
        dispatcher.dispatch(&payload).await
    }

    #[test]
    fn test_dispatch_future_is_send() {
        let dispatcher = dispatcher(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(ScriptedLauncher::always_succeed()),
        );
        // Held across an await inside a handler future, as the submission route does
        assert_send(dispatch_owned(Arc::new(dispatcher), payload(2)));
    }

    fn dispatcher(
        store: Arc<InMemoryObjectStore>,
        launcher: Arc<ScriptedLauncher>,
    ) -> TaskDispatcher {
        TaskDispatcher::new(store, launcher, DispatcherConfig::default())
    }

    #[tokio::test]
    async fn test_first_launch_fails_second_succeeds() {
        let store = Arc::new(InMemoryObjectStore::new());
        let launcher = Arc::new(ScriptedLauncher::new([false, true]));
        let summary = dispatcher(store.clone(), launcher)
            .dispatch(&payload(2))
            .await
            .unwrap();

        assert_eq!(summary.failed_task_count, 1);
        assert_eq!(summary.task_quantity, 2);
        assert!(summary.launch_handles[0].is_none());
        assert!(summary.launch_handles[1].is_some());
        assert_eq!(summary.result_versions.len(), 2);
        // Failed batches are still persisted and accounted for
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_all_launches_failing_is_total_failure() {
        let store = Arc::new(InMemoryObjectStore::new());
        let launcher = Arc::new(ScriptedLauncher::new([false, false, false]));
        let result = dispatcher(store, launcher.clone()).dispatch(&payload(3)).await;

        assert!(matches!(
            result,
            Err(EvalError::TotalLaunchFailure { task_quantity: 3 })
        ));
        assert_eq!(launcher.attempts(), 3);
    }

    #[tokio::test]
    async fn test_persisted_block_references_result_version() {
        let store = Arc::new(InMemoryObjectStore::new());
        let launcher = Arc::new(ScriptedLauncher::always_succeed());
        let summary = dispatcher(store.clone(), launcher)
            .dispatch(&payload(1))
            .await
            .unwrap();

        let version = summary.result_versions[0];
        let body = store
            .get(&format!("files/file-{version}.env"))
            .expect("batch object stored under its result version");
        let block = EnvBlock::parse(&body).unwrap();
        assert_eq!(block.result_version, version);
        assert_eq!(block.reassemble_content().unwrap(), "YmF0Y2g0");
    }

    #[tokio::test]
    async fn test_invalid_payload_launches_nothing() {
        let launcher = Arc::new(ScriptedLauncher::always_succeed());
        let mut bad = payload(2);
        bad.task_quantity = 5;
        let result = dispatcher(Arc::new(InMemoryObjectStore::new()), launcher.clone())
            .dispatch(&bad)
            .await;

        assert!(matches!(result, Err(EvalError::Validation(_))));
        assert_eq!(launcher.attempts(), 0);
    }
}
