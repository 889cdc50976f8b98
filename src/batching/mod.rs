//! # Batching
//!
//! Client-side dataset partitioning and the transport-size chunking shared by the
//! dispatcher and the worker-side consumer.

pub mod chunker;
pub mod splitter;

pub use chunker::{chunk_content, reassemble};
pub use splitter::{decode_rows, encode_rows, BatchSplitter};
