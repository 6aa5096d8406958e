//! Single-writer reduction of worker contributions

use crossbeam_channel::Receiver;
use tracing::{debug, warn};
use vismag_algorithms::visibility::SweepStats;
use vismag_core::raster::Raster;
use vismag_core::Result;

use crate::message::{TaskFailure, WorkerMessage};

/// Outcome of one scheduler run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Workers started
    pub workers: usize,
    /// Viewpoints swept to completion
    pub processed: usize,
    pub failures: Vec<TaskFailure>,
    /// Viewpoints left in the queue (only after cancellation)
    pub skipped: usize,
    pub cancelled: bool,
    /// Totals over all completed sweeps
    pub stats: SweepStats,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.skipped == 0 && self.failures.is_empty()
    }
}

/// Sole writer of the output grid during a run.
///
/// Contributions are only ever added, so the result does not depend on the
/// order in which workers deliver them.
pub struct Aggregator<'g> {
    output: &'g mut Raster<f64>,
    live_producers: usize,
    summary: RunSummary,
}

impl<'g> Aggregator<'g> {
    /// Aggregate into `output` until `producers` workers have sent
    /// [`WorkerMessage::Done`].
    pub fn new(output: &'g mut Raster<f64>, producers: usize) -> Self {
        Self {
            output,
            live_producers: producers,
            summary: RunSummary {
                workers: producers,
                ..Default::default()
            },
        }
    }

    /// Apply one message to the output grid and the running summary
    pub fn handle(&mut self, message: WorkerMessage) -> Result<()> {
        match message {
            WorkerMessage::Contributions { batch, .. } => {
                for c in batch {
                    self.output.accumulate(c.row, c.col, c.magnitude)?;
                }
            }
            WorkerMessage::Completed { worker, viewpoint, stats } => {
                debug!(worker, row = viewpoint.row, col = viewpoint.col, visible = stats.visible, "viewpoint done");
                self.summary.processed += 1;
                self.summary.stats += stats;
            }
            WorkerMessage::Failed { worker, viewpoint, error } => {
                warn!(worker, row = viewpoint.row, col = viewpoint.col, %error, "viewpoint failed");
                self.summary.failures.push(TaskFailure { viewpoint, error });
            }
            WorkerMessage::Done { worker } => {
                self.live_producers = self.live_producers.saturating_sub(1);
                debug!(worker, live = self.live_producers, "worker finished");
            }
        }
        Ok(())
    }

    /// Receive until every producer has finished or the channel disconnects.
    pub fn drain(mut self, results: &Receiver<WorkerMessage>) -> Result<RunSummary> {
        while self.live_producers > 0 {
            match results.recv() {
                Ok(message) => self.handle(message)?,
                Err(_) => {
                    warn!(live = self.live_producers, "result channel closed before all workers finished");
                    break;
                }
            }
        }
        Ok(self.summary)
    }
}
