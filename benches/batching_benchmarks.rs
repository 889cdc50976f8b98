use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalfleet_core::batching::{chunk_content, BatchSplitter};
use evalfleet_core::models::{Record, ResultVersion};
use evalfleet_core::orchestration::EnvBlock;
use serde_json::json;

fn dataset(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            json!({
                "question": format!("What does document {i} say about latency?"),
                "answer": "It depends on the cold start of the worker fleet.",
                "contexts": ["context one", "context two", "context three"],
            })
            .as_object()
            .cloned()
            .unwrap_or_default()
        })
        .collect()
}

fn benchmark_split(c: &mut Criterion) {
    let rows = dataset(5_000);
    let splitter = BatchSplitter::new(500).unwrap();
    c.bench_function("split_5000_rows_into_500", |b| {
        b.iter(|| splitter.split(black_box(&rows)).unwrap())
    });
}

fn benchmark_chunk(c: &mut Criterion) {
    let content = "ab€".repeat(100_000);
    c.bench_function("chunk_500kb_at_62000", |b| {
        b.iter(|| chunk_content(black_box(&content), 62_000).unwrap().len())
    });
}

fn benchmark_env_block(c: &mut Criterion) {
    let batch = BatchSplitter::new(5_000).unwrap().split(&dataset(2_000)).unwrap();
    let metrics = vec!["faithfulness".to_string(), "answer_relevancy".to_string()];
    c.bench_function("env_block_build_and_render", |b| {
        b.iter(|| {
            EnvBlock::build(&metrics, ResultVersion::new(), black_box(&batch[0].encoded_content), 62_000)
                .and_then(|block| block.render())
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_split, benchmark_chunk, benchmark_env_block);
criterion_main!(benches);
