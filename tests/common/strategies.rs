//! Proptest strategies for dataset rows, metric sets and transport text

use evalfleet_core::models::Record;
use proptest::prelude::*;

/// Small row objects with string and numeric columns
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (".{0,40}", any::<i32>(), proptest::option::of(".{0,20}")).prop_map(
        |(question, score, ground_truth)| {
            let mut record = Record::new();
            record.insert("question".to_string(), question.into());
            record.insert("score".to_string(), score.into());
            if let Some(truth) = ground_truth {
                record.insert("ground_truth".to_string(), truth.into());
            }
            record
        },
    )
}

/// Non-empty datasets of up to `max_rows` rows
pub fn rows_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec(record_strategy(), 1..=max_rows)
}

/// Non-empty metric sets drawn from known names, sometimes including the slow metric
pub fn metric_set_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(
        vec![
            "faithfulness",
            "answer_relevancy",
            "context_precision",
            "context_recall",
            "Lynx",
        ],
        1..=5,
    )
    .prop_map(|names| names.into_iter().map(str::to_string).collect())
}

/// Mixed-width text so chunk boundaries land inside multi-byte characters
pub fn transport_text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('Z'),
            Just('"'),
            Just('é'),
            Just('中'),
            Just('🦀'),
        ],
        0..400,
    )
    .prop_map(|chars| chars.into_iter().collect())
}
