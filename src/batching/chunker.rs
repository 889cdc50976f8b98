//! Payload Chunker
//!
//! Splits serialized content into ordered parts of at most `max_bytes` bytes each.
//! Boundaries are byte offsets with no awareness of record structure, so consumers
//! must concatenate every part before interpreting the content. A boundary that
//! would land inside a multi-byte character moves back to the character start.

use crate::error::{EvalError, Result};

/// Split `content` into parts whose concatenation reproduces it exactly.
///
/// Content that already fits is returned as a single part, including empty content.
/// Parts never split a character, so `max_bytes` must be at least the width of the
/// widest character present: any `max_bytes >= 1` works for ASCII, `max_bytes >= 4`
/// works for any text. A narrower limit is a `Validation` error. Dispatched batch
/// content is JSON-escaped base64 and therefore always ASCII.
pub fn chunk_content(content: &str, max_bytes: usize) -> Result<Vec<&str>> {
    if max_bytes == 0 {
        return Err(EvalError::validation("chunk size must be at least 1 byte"));
    }
    if content.len() <= max_bytes {
        return Ok(vec![content]);
    }

    let mut parts = Vec::with_capacity(content.len().div_ceil(max_bytes));
    let mut start = 0;
    while start < content.len() {
        let mut end = (start + max_bytes).min(content.len());
        while !content.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            return Err(EvalError::validation(format!(
                "chunk size {max_bytes} is smaller than the character at byte {start}"
            )));
        }
        parts.push(&content[start..end]);
        start = end;
    }

    Ok(parts)
}

/// Worker-side inverse of [`chunk_content`]
pub fn reassemble<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(AsRef::as_ref).collect()
}
