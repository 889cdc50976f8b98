//! # Test Doubles
//!
//! In-memory implementations of the storage, launch, endpoint and report ports for
//! unit and integration tests.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::{EvaluationEndpoint, ReportSink, StatusOutcome};
use crate::error::{EvalError, Result};
use crate::models::{LaunchSummary, ResultVersion, SubmissionPayload};
use crate::orchestration::{LaunchRequest, ObjectStore, TaskLauncher};

/// Object store backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, String>,
    fail_writes: bool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every write fails
    pub fn failing() -> Self {
        Self {
            objects: DashMap::new(),
            fail_writes: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, key: &str, body: String, _content_type: &str) -> Result<()> {
        if self.fail_writes {
            return Err(EvalError::Storage(format!("write refused for {key}")));
        }
        self.objects.insert(key.to_string(), body);
        Ok(())
    }

    fn object_uri(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}

/// Launcher that succeeds or fails according to a script, then succeeds
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    script: Mutex<VecDeque<bool>>,
    requests: Mutex<Vec<LaunchRequest>>,
    attempts: AtomicUsize,
}

impl ScriptedLauncher {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn always_succeed() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TaskLauncher for ScriptedLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<Option<String>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let succeed = self.script.lock().pop_front().unwrap_or(true);
        Ok(succeed.then(|| format!("task/{attempt}/{}", request.result_version)))
    }
}

/// One scripted answer of the status endpoint
#[derive(Debug, Clone)]
pub enum StatusStep {
    Respond { status: u16, body: String },
    TransportFailure(String),
}

impl StatusStep {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn transport(message: &str) -> Self {
        Self::TransportFailure(message.to_string())
    }
}

/// Evaluation endpoint with a fixed submission answer and a scripted status sequence.
///
/// Once the script is exhausted the status endpoint keeps answering "still running".
#[derive(Debug)]
pub struct ScriptedEndpoint {
    summary: LaunchSummary,
    rejection: Option<(u16, String)>,
    statuses: Mutex<VecDeque<StatusStep>>,
    submissions: Mutex<Vec<SubmissionPayload>>,
    status_calls: AtomicUsize,
}

impl ScriptedEndpoint {
    /// Accepts submissions with every one of `task_quantity` tasks launched
    pub fn accepting(task_quantity: usize) -> Self {
        Self::with_summary(LaunchSummary {
            failed_task_count: 0,
            launch_handles: (0..task_quantity).map(|i| Some(format!("task/{i}"))).collect(),
            result_versions: (0..task_quantity).map(|_| ResultVersion::new()).collect(),
            task_quantity,
        })
    }

    pub fn with_summary(summary: LaunchSummary) -> Self {
        Self {
            summary,
            rejection: None,
            statuses: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        let mut endpoint = Self::accepting(0);
        endpoint.rejection = Some((status, message.to_string()));
        endpoint
    }

    pub fn with_statuses(self, steps: impl IntoIterator<Item = StatusStep>) -> Self {
        self.statuses.lock().extend(steps);
        self
    }

    pub fn summary(&self) -> LaunchSummary {
        self.summary.clone()
    }

    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.submissions.lock().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvaluationEndpoint for ScriptedEndpoint {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<LaunchSummary> {
        self.submissions.lock().push(payload.clone());
        match self.rejection {
            Some((status, ref message)) => Err(EvalError::submission_rejected(status, message.clone())),
            None => Ok(self.summary.clone()),
        }
    }

    async fn check_status(&self, _summary: &LaunchSummary) -> Result<StatusOutcome> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.statuses.lock().pop_front();
        match step {
            Some(StatusStep::Respond { status, body }) => StatusOutcome::from_response(status, body),
            Some(StatusStep::TransportFailure(message)) => Err(EvalError::Transport(message)),
            None => Ok(StatusOutcome::Pending),
        }
    }
}

/// Report sink that keeps every persisted report in memory
#[derive(Debug, Default)]
pub struct InMemoryReportSink {
    reports: Mutex<Vec<String>>,
}

impl InMemoryReportSink {
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl ReportSink for InMemoryReportSink {
    async fn persist(&self, content: &str) -> Result<()> {
        self.reports.lock().push(content.to_string());
        Ok(())
    }
}
