//! # Buffer-Time Estimator
//!
//! Expected delay before polling is worth starting: a fixed worker cold start plus
//! the total work (questions scaled by metric cost) divided across the launched
//! tasks. It only delays the first poll; polling carries on past it if needed.

use std::time::Duration;

use crate::config::BufferTimeConfig;
use crate::error::{EvalError, Result};

#[derive(Debug, Clone, Default)]
pub struct BufferTimeEstimator {
    config: BufferTimeConfig,
}

impl BufferTimeEstimator {
    pub fn new(config: BufferTimeConfig) -> Self {
        Self { config }
    }

    /// `cold_start + floor(questions * (per_metric * |metrics| + slow_latency) / tasks)`
    pub fn estimate_seconds(
        &self,
        question_count: usize,
        metrics: &[String],
        task_quantity: usize,
    ) -> Result<u64> {
        if task_quantity == 0 {
            return Err(EvalError::validation("task_quantity must be at least 1"));
        }

        let slow_latency = if metrics.iter().any(|m| *m == self.config.slow_metric) {
            self.config.slow_metric_latency_seconds
        } else {
            0.0
        };
        let per_question = self.config.seconds_per_metric * metrics.len() as f64 + slow_latency;
        let work = (question_count as f64 * per_question / task_quantity as f64).floor();

        Ok(self.config.cold_start_seconds + work as u64)
    }

    pub fn estimate(
        &self,
        question_count: usize,
        metrics: &[String],
        task_quantity: usize,
    ) -> Result<Duration> {
        self.estimate_seconds(question_count, metrics, task_quantity)
            .map(Duration::from_secs)
    }
}

/// Whole minutes shown to the user, rounded up
pub fn estimated_minutes(seconds: u64) -> u64 {
    seconds.div_ceil(60)
}
