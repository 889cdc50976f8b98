//! Shared fixtures and proptest strategies for the integration suites

#![allow(dead_code)]

pub mod strategies;

use evalfleet_core::models::Record;
use serde_json::json;

/// `count` question rows with distinct content
pub fn question_rows(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            json!({
                "question": format!("What is item {i}?"),
                "answer": format!("Item {i} is a fixture"),
                "contexts": [format!("context for {i}")],
            })
            .as_object()
            .cloned()
            .unwrap_or_default()
        })
        .collect()
}

pub fn metrics(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
