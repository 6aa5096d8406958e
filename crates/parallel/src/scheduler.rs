//! Multi-viewpoint scheduling
//!
//! Viewpoints go into one task queue that is filled before any worker starts.
//! Each worker borrows the elevation grid, pops viewpoints until the queue is
//! empty, sweeps them one at a time and streams contributions to the
//! [`Aggregator`] on the calling thread. An empty queue ends a worker; it never
//! waits for more tasks.

use std::mem;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};
use vismag_algorithms::visibility::{Contribution, Sweep, SweepStats, Viewpoint, VisualMagnitudeParams};
use vismag_core::raster::{ElevationGrid, Raster};
use vismag_core::{Error, Result};

use crate::aggregator::{Aggregator, RunSummary};
use crate::cancel::CancellationToken;
use crate::message::WorkerMessage;
use crate::strategy::ProcessingMode;

/// Contributions per result message
const BATCH_SIZE: usize = 1024;

/// Accumulated visual magnitude of a run plus its summary
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Sum of every completed viewpoint's visual magnitude per cell
    pub magnitude: Raster<f64>,
    pub summary: RunSummary,
}

/// Task queue of viewpoints over one shared elevation grid
pub struct Scheduler<'a> {
    dem: &'a ElevationGrid,
    params: VisualMagnitudeParams,
    mode: ProcessingMode,
    cancel: CancellationToken,
    tasks: Vec<Viewpoint>,
}

impl<'a> Scheduler<'a> {
    pub fn new(dem: &'a ElevationGrid, params: VisualMagnitudeParams) -> Self {
        Self {
            dem,
            params,
            mode: ProcessingMode::default(),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the cancellation token, e.g. to resume after a cancelled run
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops this scheduler's next or current run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn add_task(&mut self, viewpoint: Viewpoint) {
        self.tasks.push(viewpoint);
    }

    pub fn add_tasks<I: IntoIterator<Item = Viewpoint>>(&mut self, viewpoints: I) {
        self.tasks.extend(viewpoints);
    }

    /// Viewpoints waiting to be processed
    pub fn pending(&self) -> &[Viewpoint] {
        &self.tasks
    }

    /// Process every queued viewpoint into a fresh zeroed grid.
    pub fn run(&mut self) -> Result<AnalysisReport> {
        let (rows, cols) = self.dem.shape();
        let mut magnitude = self.dem.with_same_meta::<f64>(rows, cols);
        let summary = self.run_into(&mut magnitude)?;

        let range = magnitude.statistics();
        debug!(max = ?range.max, mean = ?range.mean, "accumulated magnitude");
        Ok(AnalysisReport { magnitude, summary })
    }

    /// Process every queued viewpoint, adding into `output`.
    ///
    /// `output` is only ever added to, so a grid holding an earlier partial
    /// result keeps accumulating. Viewpoints not started because of
    /// cancellation stay queued for the next call.
    pub fn run_into(&mut self, output: &mut Raster<f64>) -> Result<RunSummary> {
        self.dem.validate()?;
        self.params.validate()?;
        let (rows, cols) = self.dem.shape();
        if output.shape() != (rows, cols) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: output.rows(),
                ac: output.cols(),
            });
        }

        let tasks = mem::take(&mut self.tasks);
        if tasks.is_empty() || self.cancel.is_cancelled() {
            let cancelled = self.cancel.is_cancelled();
            if cancelled {
                warn!(pending = tasks.len(), "run cancelled before start");
            }
            let skipped = tasks.len();
            self.tasks = tasks;
            return Ok(RunSummary {
                skipped,
                cancelled,
                ..Default::default()
            });
        }

        let workers = self.mode.worker_count().min(tasks.len());
        info!(viewpoints = tasks.len(), workers, rows, cols, "starting visual magnitude run");

        let (task_tx, task_rx) = unbounded();
        for viewpoint in tasks {
            // The receiver is alive, so this cannot fail.
            let _ = task_tx.send(viewpoint);
        }
        drop(task_tx);

        let (result_tx, result_rx) = unbounded();
        let dem = self.dem;
        let params = &self.params;
        let cancel = &self.cancel;

        let drained = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let tasks = task_rx.clone();
                    let results = result_tx.clone();
                    s.spawn(move || worker_loop(worker, dem, params, &tasks, results, cancel))
                })
                .collect();
            drop(result_tx);

            let drained = Aggregator::new(output, workers).drain(&result_rx);

            for (worker, handle) in handles.into_iter().enumerate() {
                if let Err(payload) = handle.join() {
                    warn!(worker, message = %panic_message(payload.as_ref()), "worker panicked");
                }
            }
            drained
        });

        self.tasks.extend(task_rx.try_iter());
        let mut summary = drained?;
        summary.skipped = self.tasks.len();
        summary.cancelled = self.cancel.is_cancelled();

        info!(
            processed = summary.processed,
            failed = summary.failures.len(),
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            visible = summary.stats.visible,
            "visual magnitude run finished"
        );
        Ok(summary)
    }
}

/// Sends the end-of-work marker when a worker exits, panics included. A panic
/// in the middle of a sweep also reports that viewpoint as failed.
struct DoneGuard {
    worker: usize,
    results: Sender<WorkerMessage>,
    current: Option<Viewpoint>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if let Some(viewpoint) = self.current.take() {
            let _ = self.results.send(WorkerMessage::Failed {
                worker: self.worker,
                viewpoint,
                error: Error::WorkerPanicked {
                    worker: self.worker,
                    message: "sweep did not finish".into(),
                },
            });
        }
        let _ = self.results.send(WorkerMessage::Done { worker: self.worker });
    }
}

fn worker_loop(
    worker: usize,
    dem: &ElevationGrid,
    params: &VisualMagnitudeParams,
    tasks: &Receiver<Viewpoint>,
    results: Sender<WorkerMessage>,
    cancel: &CancellationToken,
) {
    let mut guard = DoneGuard {
        worker,
        results,
        current: None,
    };

    loop {
        if cancel.is_cancelled() {
            debug!(worker, "cancelled, not taking further viewpoints");
            break;
        }
        let Ok(viewpoint) = tasks.try_recv() else {
            break;
        };

        guard.current = Some(viewpoint);
        let message = match sweep_viewpoint(worker, dem, &viewpoint, params, &guard.results) {
            Ok(stats) => WorkerMessage::Completed {
                worker,
                viewpoint,
                stats,
            },
            Err(error) => WorkerMessage::Failed {
                worker,
                viewpoint,
                error,
            },
        };
        guard.current = None;
        let _ = guard.results.send(message);
    }
}

/// Sweep one viewpoint, streaming its contributions in batches.
///
/// Contributions sent before a mid-sweep failure remain in the output.
fn sweep_viewpoint(
    worker: usize,
    dem: &ElevationGrid,
    viewpoint: &Viewpoint,
    params: &VisualMagnitudeParams,
    results: &Sender<WorkerMessage>,
) -> Result<SweepStats> {
    let mut sweep = Sweep::new(dem, viewpoint, params)?;

    let mut batch: Vec<Contribution> = Vec::with_capacity(BATCH_SIZE);
    let stats = sweep.run(|c| {
        batch.push(c);
        if batch.len() == BATCH_SIZE {
            let full = mem::replace(&mut batch, Vec::with_capacity(BATCH_SIZE));
            let _ = results.send(WorkerMessage::Contributions { worker, batch: full });
        }
    })?;
    if !batch.is_empty() {
        let _ = results.send(WorkerMessage::Contributions { worker, batch });
    }
    Ok(stats)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Accumulated visual magnitude of `viewpoints` over `dem`.
///
/// Failed viewpoints are listed in the report and do not stop the others.
///
/// # Example
///
/// ```ignore
/// let report = visual_magnitude_map(&dem, &viewpoints, VisualMagnitudeParams::default(), ProcessingMode::Parallel)?;
/// let total = report.magnitude.statistics();
/// ```
pub fn visual_magnitude_map(
    dem: &ElevationGrid,
    viewpoints: &[Viewpoint],
    params: VisualMagnitudeParams,
    mode: ProcessingMode,
) -> Result<AnalysisReport> {
    let mut scheduler = Scheduler::new(dem, params).with_mode(mode);
    scheduler.add_tasks(viewpoints.iter().copied());
    scheduler.run()
}
