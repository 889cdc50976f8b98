//! # Evaluation Fleet Configuration
//!
//! Typed configuration for the submission client, the cold-start estimator, the
//! completion poller and the dispatcher that runs behind the submission endpoint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use evalfleet_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let refresh = manager.config().polling.refresh_rate();
//! # Ok(())
//! # }
//! ```
//!
//! Endpoint addresses, tokens, storage locations and network placement values are
//! opaque pass-through strings; only the numeric tunables are validated.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::defaults;
use crate::error::{EvalError, Result};

pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/evalfleet.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EvalConfig {
    pub client: ClientConfig,
    pub polling: PollingConfig,
    pub buffer: BufferTimeConfig,
    pub batching: BatchingConfig,
    pub dispatcher: DispatcherConfig,
    pub web: WebConfig,
    pub report: ReportConfig,
}

/// Submission and status endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub submission_url: String,
    pub status_url: String,
    pub auth_token: Option<String>,
    pub api_key_header: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            submission_url: "http://localhost:8080/v1/submissions".to_string(),
            status_url: "http://localhost:8081/v1/status".to_string(),
            auth_token: None,
            api_key_header: defaults::API_KEY_HEADER.to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Completion poll loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub refresh_rate_seconds: u64,
    pub refresh_message: bool,
    pub max_transport_retries: u32,
    /// Upper bound on the whole poll phase; unbounded when absent
    pub deadline_seconds: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_rate_seconds: defaults::REFRESH_RATE_SECONDS,
            refresh_message: false,
            max_transport_retries: defaults::MAX_TRANSPORT_RETRIES,
            deadline_seconds: None,
        }
    }
}

impl PollingConfig {
    pub fn refresh_rate(&self) -> Duration {
        Duration::from_secs(self.refresh_rate_seconds)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

/// Cold-start buffer heuristic
///
/// `estimate = cold_start + floor(questions * (per_metric * |metrics| + slow_latency) / tasks)`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferTimeConfig {
    pub cold_start_seconds: u64,
    pub seconds_per_metric: f64,
    pub slow_metric: String,
    pub slow_metric_latency_seconds: f64,
}

impl Default for BufferTimeConfig {
    fn default() -> Self {
        Self {
            cold_start_seconds: defaults::COLD_START_SECONDS,
            seconds_per_metric: defaults::SECONDS_PER_METRIC,
            slow_metric: defaults::SLOW_METRIC.to_string(),
            slow_metric_latency_seconds: defaults::SLOW_METRIC_LATENCY_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchingConfig {
    pub max_batch_size: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: defaults::MAX_BATCH_SIZE,
        }
    }
}

/// Settings for the dispatcher hosted by the submission endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub max_transport_bytes: usize,
    pub launch_concurrency: usize,
    pub storage_root: PathBuf,
    pub bucket_name: String,
    pub folder_name: String,
    pub launch_url: String,
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_transport_bytes: defaults::MAX_TRANSPORT_BYTES,
            launch_concurrency: defaults::LAUNCH_CONCURRENCY,
            storage_root: PathBuf::from("./storage"),
            bucket_name: "temporary-evaluation-files".to_string(),
            folder_name: "files".to_string(),
            launch_url: "http://localhost:9090/v1/tasks".to_string(),
            cluster: "evaluationcluster".to_string(),
            task_definition: String::new(),
            container_name: "evalcontainer".to_string(),
            subnets: Vec::new(),
            security_groups: Vec::new(),
            assign_public_ip: true,
        }
    }
}

/// Submission endpoint server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    /// Required in the configured API-key header when set
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            api_key: None,
            api_key_header: defaults::API_KEY_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(defaults::REPORT_PATH),
        }
    }
}

impl EvalConfig {
    /// Reject tunables that would make the pipeline loop forever or divide by zero
    pub fn validate(&self) -> Result<()> {
        if self.batching.max_batch_size == 0 {
            return Err(EvalError::Configuration(
                "batching.max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.max_transport_bytes == 0 {
            return Err(EvalError::Configuration(
                "dispatcher.max_transport_bytes must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.launch_concurrency == 0 {
            return Err(EvalError::Configuration(
                "dispatcher.launch_concurrency must be at least 1".to_string(),
            ));
        }
        if self.polling.refresh_rate_seconds == 0 {
            return Err(EvalError::Configuration(
                "polling.refresh_rate_seconds must be at least 1".to_string(),
            ));
        }
        if self.buffer.seconds_per_metric < 0.0 || self.buffer.slow_metric_latency_seconds < 0.0 {
            return Err(EvalError::Configuration(
                "buffer latencies must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
