//! # Worker Environment Block
//!
//! The line-oriented `KEY=value` record persisted for each batch and handed to its
//! worker as an environment file:
//!
//! ```text
//! METRICS=["faithfulness","answer_relevancy"]
//! RESULT_VERSION=6f1c1c9e-...-...
//! FILE_CONTENT_1=<first part>
//! FILE_CONTENT_2=<second part>
//! ```
//!
//! Individual values are limited by the worker transport while the object as a
//! whole is not, so the JSON-string-serialized batch content is chunked across
//! numbered keys. Parts are always numbered, starting at 1.

use std::fmt::Write as _;

use crate::batching::{chunk_content, reassemble};
use crate::constants::env_keys;
use crate::error::{EvalError, Result};
use crate::models::ResultVersion;

#[derive(Debug, Clone, PartialEq)]
pub struct EnvBlock {
    pub metrics: Vec<String>,
    pub result_version: ResultVersion,
    pub content_parts: Vec<String>,
}

impl EnvBlock {
    /// Build the block for one batch, chunking its content to `max_transport_bytes`
    pub fn build(
        metrics: &[String],
        result_version: ResultVersion,
        encoded_batch: &str,
        max_transport_bytes: usize,
    ) -> Result<Self> {
        let serialized = serde_json::to_string(encoded_batch)?;
        let content_parts = chunk_content(&serialized, max_transport_bytes)?
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            metrics: metrics.to_vec(),
            result_version,
            content_parts,
        })
    }

    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{}={}\n{}={}",
            env_keys::METRICS,
            serde_json::to_string(&self.metrics)?,
            env_keys::RESULT_VERSION,
            self.result_version
        );
        for (i, part) in self.content_parts.iter().enumerate() {
            let _ = write!(out, "\n{}{}={}", env_keys::FILE_CONTENT_PREFIX, i + 1, part);
        }
        Ok(out)
    }

    /// Parse a rendered block, ordering content parts by their number
    pub fn parse(text: &str) -> Result<Self> {
        let mut metrics = None;
        let mut result_version = None;
        let mut numbered_parts: Vec<(usize, String)> = Vec::new();

        for line in text.lines().filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| EvalError::validation(format!("malformed env line: {line}")))?;

            if key == env_keys::METRICS {
                metrics = Some(serde_json::from_str::<Vec<String>>(value)?);
            } else if key == env_keys::RESULT_VERSION {
                let uuid = uuid::Uuid::parse_str(value).map_err(|e| {
                    EvalError::validation(format!("invalid {}: {e}", env_keys::RESULT_VERSION))
                })?;
                result_version = Some(ResultVersion::from(uuid));
            } else if let Some(number) = key.strip_prefix(env_keys::FILE_CONTENT_PREFIX) {
                let number: usize = number
                    .parse()
                    .map_err(|_| EvalError::validation(format!("invalid content key: {key}")))?;
                numbered_parts.push((number, value.to_string()));
            } else {
                return Err(EvalError::validation(format!("unexpected env key: {key}")));
            }
        }

        numbered_parts.sort_by_key(|(number, _)| *number);
        let expected: Vec<usize> = (1..=numbered_parts.len()).collect();
        if numbered_parts.iter().map(|(n, _)| *n).collect::<Vec<_>>() != expected {
            return Err(EvalError::validation("content parts are not numbered 1..=n"));
        }

        Ok(Self {
            metrics: metrics
                .ok_or_else(|| EvalError::validation(format!("missing {}", env_keys::METRICS)))?,
            result_version: result_version.ok_or_else(|| {
                EvalError::validation(format!("missing {}", env_keys::RESULT_VERSION))
            })?,
            content_parts: numbered_parts.into_iter().map(|(_, part)| part).collect(),
        })
    }

    /// Concatenate the parts and undo the JSON-string serialization
    pub fn reassemble_content(&self) -> Result<String> {
        Ok(serde_json::from_str(&reassemble(&self.content_parts))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Vec<String> {
        vec!["faithfulness".to_string(), "Lynx".to_string()]
    }

    #[test]
    fn test_small_content_uses_single_numbered_key() {
        let version = ResultVersion::new();
        let block = EnvBlock::build(&metrics(), version, "QUJD", 62_000).unwrap();
        let rendered = block.render().unwrap();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], r#"METRICS=["faithfulness","Lynx"]"#);
        assert_eq!(lines[1], format!("RESULT_VERSION={version}"));
        assert_eq!(lines[2], r#"FILE_CONTENT_1="QUJD""#);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_large_content_is_split_and_reassembled() {
        let encoded = "QUJD".repeat(40_000);
        let block = EnvBlock::build(&metrics(), ResultVersion::new(), &encoded, 62_000).unwrap();
        assert_eq!(block.content_parts.len(), 3);
        assert!(block.content_parts.iter().all(|p| p.len() <= 62_000));

        let parsed = EnvBlock::parse(&block.render().unwrap()).unwrap();
        assert_eq!(parsed, block);
        assert_eq!(parsed.reassemble_content().unwrap(), encoded);
    }

    #[test]
    fn test_parse_orders_parts_by_number() {
        let version = ResultVersion::new();
        let text = format!(
            "METRICS=[\"m\"]\nRESULT_VERSION={version}\nFILE_CONTENT_2=cd\"\nFILE_CONTENT_1=\"ab"
        );
        let parsed = EnvBlock::parse(&text).unwrap();
        assert_eq!(parsed.reassemble_content().unwrap(), "abcd");
    }

    #[test]
    fn test_parse_rejects_gaps_and_unknown_keys() {
        let version = ResultVersion::new();
        let gap = format!("METRICS=[\"m\"]\nRESULT_VERSION={version}\nFILE_CONTENT_2=\"x\"");
        assert!(EnvBlock::parse(&gap).is_err());

        let unknown = format!("METRICS=[\"m\"]\nRESULT_VERSION={version}\nOTHER=1");
        assert!(EnvBlock::parse(&unknown).is_err());
    }
}
