//! # Web Application State

use std::sync::Arc;

use crate::config::WebConfig;
use crate::orchestration::TaskDispatcher;

/// Shared by every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<TaskDispatcher>,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(dispatcher: TaskDispatcher, config: WebConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }
}
