//! Batch
//!
//! A contiguous, size-bounded slice of the dataset processed by exactly one worker.

use serde::{Deserialize, Serialize};

use super::evaluation_request::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// 0-based position among the submission's batches
    pub index: usize,
    /// Offset of the first row of this batch in the original dataset
    pub start_row: usize,
    pub rows: Vec<Record>,
    /// Transport form of `rows` (base64 of the JSON array)
    pub encoded_content: String,
}

impl Batch {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Dataset row range covered by this batch
    pub fn row_range(&self) -> std::ops::Range<usize> {
        self.start_row..self.start_row + self.rows.len()
    }
}
