//! Messages from workers to the aggregator

use vismag_algorithms::visibility::{Contribution, SweepStats, Viewpoint};
use vismag_core::Error;

/// Everything a worker reports on the result channel.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Per-cell contributions of the viewpoint a worker is sweeping.
    Contributions {
        worker: usize,
        batch: Vec<Contribution>,
    },
    /// A viewpoint was swept to completion.
    Completed {
        worker: usize,
        viewpoint: Viewpoint,
        stats: SweepStats,
    },
    /// A viewpoint was rejected or its sweep failed.
    Failed {
        worker: usize,
        viewpoint: Viewpoint,
        error: Error,
    },
    /// End-of-work marker; the worker sends nothing after it.
    Done { worker: usize },
}

/// A viewpoint that could not be processed
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub viewpoint: Viewpoint,
    pub error: Error,
}
