//! # VisMag Parallel
//!
//! Concurrent visual magnitude over many viewpoints.
//!
//! This crate provides:
//! - A task queue of viewpoints drained by a pool of scoped worker threads that
//!   share one read-only elevation grid
//! - A single-writer aggregator summing per-cell contributions into one grid
//! - Cooperative cancellation and resumable accumulation

pub mod aggregator;
pub mod cancel;
pub mod message;
pub mod scheduler;
pub mod strategy;

pub use aggregator::{Aggregator, RunSummary};
pub use cancel::CancellationToken;
pub use message::{TaskFailure, WorkerMessage};
pub use scheduler::{visual_magnitude_map, AnalysisReport, Scheduler};
pub use strategy::ProcessingMode;
