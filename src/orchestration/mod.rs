//! # Orchestration Engine
//!
//! Server-side half of the job protocol, hosted by the submission endpoint.
//!
//! ## Core Components
//!
//! - **TaskDispatcher**: per-submission loop that persists and launches one worker per batch
//! - **EnvBlock**: the chunked `KEY=value` record each worker is started with
//! - **ObjectStore**: durable storage port, keyed by result version
//! - **TaskLauncher**: worker launch port; "no running task" is a counted failure, not an error

pub mod dispatcher;
pub mod env_block;
pub mod launcher;
pub mod storage;

pub use dispatcher::TaskDispatcher;
pub use env_block::EnvBlock;
pub use launcher::{HttpTaskLauncher, LaunchRequest, TaskLauncher};
pub use storage::{object_key, LocalObjectStore, ObjectStore};
