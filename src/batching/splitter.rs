//! Batch Splitter
//!
//! Partitions the dataset into `ceil(rows / max_batch_size)` contiguous batches in
//! row order. Boundaries depend only on the row count and the limit, so repeated
//! runs over the same input produce identical batches.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{EvalError, Result};
use crate::logging::log_batch_operation;
use crate::models::{Batch, Record};

#[derive(Debug, Clone, Copy)]
pub struct BatchSplitter {
    max_batch_size: usize,
}

impl BatchSplitter {
    pub fn new(max_batch_size: usize) -> Result<Self> {
        if max_batch_size < 1 {
            return Err(EvalError::validation("max_batch_size must be at least 1"));
        }
        Ok(Self { max_batch_size })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Number of batches `split` will produce for `row_count` rows
    pub fn batch_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.max_batch_size)
    }

    pub fn split(&self, rows: &[Record]) -> Result<Vec<Batch>> {
        if rows.is_empty() {
            return Err(EvalError::validation("dataset contains no rows"));
        }

        rows.chunks(self.max_batch_size)
            .enumerate()
            .map(|(index, chunk)| {
                let encoded_content = encode_rows(chunk)?;
                log_batch_operation("split", index, chunk.len(), encoded_content.len());
                Ok(Batch {
                    index,
                    start_row: index * self.max_batch_size,
                    rows: chunk.to_vec(),
                    encoded_content,
                })
            })
            .collect()
    }
}

/// Serialize rows to their transport form: base64 of the JSON array
pub fn encode_rows(rows: &[Record]) -> Result<String> {
    let json = serde_json::to_vec(rows)?;
    Ok(STANDARD.encode(json))
}

/// Inverse of [`encode_rows`]
pub fn decode_rows(encoded: &str) -> Result<Vec<Record>> {
    let bytes = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&bytes)?)
}
