//! # System Constants
//!
//! Wire keys, status codes and default tunables shared by the client and the
//! submission endpoint.

use serde::{Deserialize, Serialize};

/// Keys used in the line-oriented key/value block handed to each worker
pub mod env_keys {
    pub const METRICS: &str = "METRICS";
    pub const RESULT_VERSION: &str = "RESULT_VERSION";
    /// Numbered from 1: `FILE_CONTENT_1`, `FILE_CONTENT_2`, ...
    pub const FILE_CONTENT_PREFIX: &str = "FILE_CONTENT_";
}

/// Status codes returned by the status endpoint
pub mod status_codes {
    pub const COMPLETE: u16 = 200;
    pub const NOT_READY: u16 = 400;
    pub const REMOTE_ERROR: u16 = 500;
}

/// Keys of the final result object
pub mod result_keys {
    pub const REPORT_ARTIFACT: &str = "HTML";
    pub const DETAILS: &str = "details";
}

/// Default tunables
pub mod defaults {
    /// Hard transport limit per field is 65536 bytes; leave room for encoding differences.
    pub const MAX_TRANSPORT_BYTES: usize = 62_000;
    pub const MAX_BATCH_SIZE: usize = 100_000;
    pub const REFRESH_RATE_SECONDS: u64 = 10;
    pub const MAX_TRANSPORT_RETRIES: u32 = 3;
    pub const LAUNCH_CONCURRENCY: usize = 1;

    pub const COLD_START_SECONDS: u64 = 370;
    pub const SECONDS_PER_METRIC: f64 = 2.7;
    pub const SLOW_METRIC: &str = "Lynx";
    pub const SLOW_METRIC_LATENCY_SECONDS: f64 = 180.0;

    pub const REPORT_PATH: &str = "./evaluation_report.html";
    pub const API_KEY_HEADER: &str = "x-api-key";
    pub const ENV_FILE_CONTENT_TYPE: &str = "application/json";
    pub const TOTAL_LAUNCH_FAILURE_MESSAGE: &str = "Failed to start all tasks";
}

/// Client-side state of the completion poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Polling,
    Done,
    Fatal,
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollState::Polling => write!(f, "polling"),
            PollState::Done => write!(f, "done"),
            PollState::Fatal => write!(f, "fatal"),
        }
    }
}
