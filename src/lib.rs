//! ioduel - sync vs async positional file IO latency benchmark
//!
//! ioduel runs one workload under two different IO execution models and
//! reports the wall-clock latency of both side by side:
//!
//! - **Sync pool**: blocking pread/pwrite calls dispatched from a bounded
//!   worker-thread pool, timed from submission start to pool drain.
//! - **Completion callbacks**: the same positional operations issued through
//!   a callback channel backed by its own worker pool, timed from submission
//!   start to the last completion.
//!
//! # Architecture
//!
//! - **Access plans**: one random permutation of operation indices per
//!   workload instance, shared by both phases so the models are compared
//!   under an identical access pattern
//! - **Segment buffers**: allocated once per instance and reused across
//!   phases via a cursor reset
//! - **Workloads**: read and write directions are independent instances; a
//!   read instance is constructed from the receipt of a prior write
//! - **Driver**: iterates a fixed configuration grid and prints one result
//!   line per direction per configuration

pub mod buffer;
pub mod config;
pub mod engine;
pub mod output;
pub mod plan;
pub mod target;
pub mod util;
pub mod workload;

// Re-export commonly used types
pub use config::BenchConfig;
pub use engine::Direction;

/// Result type used throughout ioduel
pub type Result<T> = anyhow::Result<T>;
