//! # Worker Launcher
//!
//! Port for requesting one worker task per persisted batch. A launch that yields no
//! running task is reported as `Ok(None)`: a per-batch launch failure that the
//! dispatcher counts. `Err` is reserved for failures of the launch service itself,
//! which abort the whole dispatch.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DispatcherConfig;
use crate::error::{EvalError, Result};
use crate::models::ResultVersion;

/// Everything the launch service needs to start one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub result_version: ResultVersion,
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    /// Environment file the container is started with
    pub environment_file_uri: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
}

impl LaunchRequest {
    pub fn from_config(
        config: &DispatcherConfig,
        result_version: ResultVersion,
        environment_file_uri: String,
    ) -> Self {
        Self {
            result_version,
            cluster: config.cluster.clone(),
            task_definition: config.task_definition.clone(),
            container_name: config.container_name.clone(),
            environment_file_uri,
            subnets: config.subnets.clone(),
            security_groups: config.security_groups.clone(),
            assign_public_ip: config.assign_public_ip,
        }
    }
}

#[async_trait]
pub trait TaskLauncher: Send + Sync {
    /// Returns the running task's handle, or `None` when no task was started
    async fn launch(&self, request: &LaunchRequest) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct LaunchResponse {
    #[serde(default)]
    tasks: Vec<LaunchedTask>,
    #[serde(default)]
    failures: Vec<LaunchFailure>,
}

#[derive(Debug, Deserialize)]
struct LaunchedTask {
    task_arn: String,
}

#[derive(Debug, Deserialize)]
struct LaunchFailure {
    #[serde(default)]
    reason: Option<String>,
}

/// Launcher that posts launch requests to a container-launch HTTP service
#[derive(Debug, Clone)]
pub struct HttpTaskLauncher {
    client: Client,
    launch_url: String,
}

impl HttpTaskLauncher {
    pub fn new(launch_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("evalfleet-dispatcher/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EvalError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            launch_url: launch_url.into(),
        })
    }
}

#[async_trait]
impl TaskLauncher for HttpTaskLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<Option<String>> {
        let response = self
            .client
            .post(&self.launch_url)
            .json(request)
            .send()
            .await
            .map_err(|e| EvalError::Dispatch(format!("launch request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::Dispatch(format!(
                "launch service returned HTTP {status}: {body}"
            )));
        }

        let parsed: LaunchResponse = response
            .json()
            .await
            .map_err(|e| EvalError::Dispatch(format!("invalid launch response: {e}")))?;

        match parsed.tasks.into_iter().next() {
            Some(task) => {
                debug!(result_version = %request.result_version, task_arn = %task.task_arn, "Launch accepted");
                Ok(Some(task.task_arn))
            }
            None => {
                let reasons: Vec<String> = parsed
                    .failures
                    .into_iter()
                    .filter_map(|f| f.reason)
                    .collect();
                warn!(
                    result_version = %request.result_version,
                    reasons = ?reasons,
                    "Launch service started no task"
                );
                Ok(None)
            }
        }
    }
}
