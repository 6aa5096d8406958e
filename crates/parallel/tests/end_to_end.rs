//! End-to-end runs of the scheduler and aggregator on synthetic terrain.

use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use vismag_algorithms::visibility::{viewpoints_from_mask, Viewpoint, VisualMagnitudeParams};
use vismag_core::{Error, GeoTransform, Raster};
use vismag_parallel::{visual_magnitude_map, CancellationToken, ProcessingMode, Scheduler};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn dem_from_fn(rows: usize, cols: usize, cell: f64, f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
    let mut dem = Raster::new(rows, cols);
    dem.set_transform(GeoTransform::with_cell_size(cell));
    for r in 0..rows {
        for c in 0..cols {
            dem.set(r, c, f(r, c)).unwrap();
        }
    }
    dem
}

fn hills(rows: usize, cols: usize) -> Raster<f64> {
    dem_from_fn(rows, cols, 10.0, |r, c| {
        let (y, x) = (r as f64, c as f64);
        40.0 * (x / 6.0).sin() * (y / 9.0).cos() + 2.0 * y
    })
}

fn assert_grids_eq(a: &Raster<f64>, b: &Raster<f64>) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.data().iter().zip(b.data().iter()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-9);
    }
}

#[test]
fn cone_from_apex_is_fully_visible() {
    init_tracing();
    let (n, centre) = (31, 15);
    let dem = dem_from_fn(n, n, 1.0, |r, c| {
        let dr = r as f64 - centre as f64;
        let dc = c as f64 - centre as f64;
        200.0 - 0.5 * dr.hypot(dc)
    });

    let report = visual_magnitude_map(
        &dem,
        &[Viewpoint::new(centre, centre, 1.7)],
        VisualMagnitudeParams::default(),
        ProcessingMode::ParallelWith(4),
    )
    .unwrap();

    assert_eq!(report.summary.workers, 1);
    assert_eq!(report.summary.processed, 1);
    assert_eq!(report.summary.stats.visible, n * n - 1);
    assert_eq!(report.summary.stats.occluded, 0);

    // Strictly decreasing eastward, short of the zero-padded border column.
    let row = report.magnitude.data().row(centre).to_vec();
    for col in centre + 1..n - 2 {
        assert!(row[col] > 0.0);
        assert!(row[col + 1] < row[col], "col {}: {} !< {}", col + 1, row[col + 1], row[col]);
    }
}

#[test]
fn ridge_hides_the_far_side() {
    init_tracing();
    let dem = dem_from_fn(30, 21, 1.0, |r, _| if r == 10 { 100.0 } else { 0.5 * r as f64 });

    let report = visual_magnitude_map(
        &dem,
        &[Viewpoint::new(2, 10, 2.0)],
        VisualMagnitudeParams::default(),
        ProcessingMode::Sequential,
    )
    .unwrap();

    let m = &report.magnitude;
    assert!(m.get(5, 10).unwrap() > 0.0);
    assert!(m.get(8, 10).unwrap() > 0.0);
    for r in 11..30 {
        for c in 0..21 {
            assert_eq!(m.get(r, c).unwrap(), 0.0, "cell ({}, {}) behind the ridge", r, c);
        }
    }
}

#[test]
fn failed_tasks_do_not_block_the_run() {
    init_tracing();
    let mut dem = hills(20, 20);
    dem.set(3, 3, f64::NAN).unwrap();

    let viewpoints = [
        Viewpoint::new(5, 5, 1.7),
        Viewpoint::new(25, 2, 1.7),
        Viewpoint::new(3, 3, 1.7),
        Viewpoint::new(15, 12, 1.7),
    ];
    let report = visual_magnitude_map(
        &dem,
        &viewpoints,
        VisualMagnitudeParams::default(),
        ProcessingMode::ParallelWith(3),
    )
    .unwrap();

    let summary = &report.summary;
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failures.len(), 2);
    assert!(!summary.is_complete());

    let out_of_bounds = summary
        .failures
        .iter()
        .find(|f| f.viewpoint == viewpoints[1])
        .unwrap();
    assert!(matches!(out_of_bounds.error, Error::IndexOutOfBounds { row: 25, .. }));
    let on_nan = summary.failures.iter().find(|f| f.viewpoint == viewpoints[2]).unwrap();
    assert!(matches!(on_nan.error, Error::Algorithm(_)));

    // Same result as running only the valid viewpoints.
    let valid = visual_magnitude_map(
        &dem,
        &[viewpoints[0], viewpoints[3]],
        VisualMagnitudeParams::default(),
        ProcessingMode::Sequential,
    )
    .unwrap();
    assert_grids_eq(&report.magnitude, &valid.magnitude);
}

#[test]
fn worker_count_does_not_change_the_result() {
    init_tracing();
    let dem = hills(40, 35);

    let mut path: Raster<u8> = Raster::new(40, 35);
    for i in 0..12 {
        path.set(3 + i * 3, 2 + i * 2, 1).unwrap();
    }
    let viewpoints = viewpoints_from_mask(&path, 1.7);
    assert_eq!(viewpoints.len(), 12);

    let params = VisualMagnitudeParams {
        omitted_radius: 1,
        ..Default::default()
    };
    let single = visual_magnitude_map(&dem, &viewpoints, params.clone(), ProcessingMode::Sequential).unwrap();
    let pooled = visual_magnitude_map(&dem, &viewpoints, params, ProcessingMode::ParallelWith(5)).unwrap();

    assert_eq!(single.summary.workers, 1);
    assert_eq!(pooled.summary.workers, 5);
    assert_eq!(single.summary.processed, 12);
    assert_eq!(single.summary.stats, pooled.summary.stats);
    assert!(single.magnitude.statistics().max.is_some_and(|m| m > 0.0));
    assert_grids_eq(&single.magnitude, &pooled.magnitude);
}

#[test]
fn cancelled_run_keeps_tasks_and_resumes() {
    init_tracing();
    let dem = hills(25, 25);
    let viewpoints: Vec<_> = (0..6).map(|i| Viewpoint::new(2 + i * 4, 20 - i * 3, 1.7)).collect();

    let token = CancellationToken::new();
    token.cancel();
    let mut scheduler = Scheduler::new(&dem, VisualMagnitudeParams::default())
        .with_mode(ProcessingMode::ParallelWith(2))
        .with_cancellation(token);
    scheduler.add_tasks(viewpoints.iter().copied());

    let mut grid = Raster::new(25, 25);
    let summary = scheduler.run_into(&mut grid).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 6);
    assert_eq!(scheduler.pending().len(), 6);
    assert!(grid.data().iter().all(|&v| v == 0.0));

    let mut scheduler = scheduler.with_cancellation(CancellationToken::new());
    let summary = scheduler.run_into(&mut grid).unwrap();
    assert!(summary.is_complete());
    assert_eq!(summary.processed, 6);
    assert!(scheduler.pending().is_empty());

    let fresh = visual_magnitude_map(
        &dem,
        &viewpoints,
        VisualMagnitudeParams::default(),
        ProcessingMode::Sequential,
    )
    .unwrap();
    assert_grids_eq(&grid, &fresh.magnitude);
}

#[test]
fn cancelling_during_a_run_keeps_unstarted_viewpoints() {
    init_tracing();
    let dem = hills(60, 60);
    let viewpoints: Vec<_> = (0..200).map(|i| Viewpoint::new(i / 10 * 3, i % 10 * 6, 1.7)).collect();
    let params = VisualMagnitudeParams::default();

    let mut scheduler = Scheduler::new(&dem, params.clone()).with_mode(ProcessingMode::ParallelWith(2));
    scheduler.add_tasks(viewpoints.iter().copied());
    let token = scheduler.cancellation_token();

    let mut grid = Raster::new(60, 60);
    let summary = thread::scope(|s| {
        s.spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        });
        scheduler.run_into(&mut grid).unwrap()
    });

    assert!(summary.failures.is_empty());
    assert_eq!(summary.processed + summary.skipped + summary.failures.len(), viewpoints.len());
    assert_eq!(scheduler.pending().len(), summary.skipped);
    assert!(summary.cancelled || summary.skipped == 0);

    // In-flight sweeps were aggregated in full; unstarted ones left no trace.
    let pending = scheduler.pending().to_vec();
    let processed: Vec<_> = viewpoints.iter().copied().filter(|v| !pending.contains(v)).collect();
    assert_eq!(processed.len(), summary.processed);
    let expected = visual_magnitude_map(&dem, &processed, params.clone(), ProcessingMode::Sequential).unwrap();
    assert_grids_eq(&grid, &expected.magnitude);

    // Resuming finishes the rest into the same grid.
    let mut scheduler = scheduler.with_cancellation(CancellationToken::new());
    let resumed = scheduler.run_into(&mut grid).unwrap();
    assert_eq!(resumed.processed, pending.len());
    assert!(scheduler.pending().is_empty());
    let full = visual_magnitude_map(&dem, &viewpoints, params, ProcessingMode::Sequential).unwrap();
    assert_grids_eq(&grid, &full.magnitude);
}

#[test]
fn run_into_only_adds() {
    let dem = hills(18, 18);
    let viewpoint = Viewpoint::new(9, 4, 1.7);
    let once = visual_magnitude_map(&dem, &[viewpoint], VisualMagnitudeParams::default(), ProcessingMode::Sequential)
        .unwrap()
        .magnitude;

    let mut grid = once.clone();
    let mut scheduler = Scheduler::new(&dem, VisualMagnitudeParams::default()).with_mode(ProcessingMode::Sequential);
    scheduler.add_task(viewpoint);
    scheduler.run_into(&mut grid).unwrap();

    for (twice, single) in grid.data().iter().zip(once.data().iter()) {
        assert_relative_eq!(*twice, 2.0 * single, epsilon = 1e-12);
    }
}

#[test]
fn mismatched_output_grid_is_rejected() {
    let dem = hills(10, 10);
    let mut scheduler = Scheduler::new(&dem, VisualMagnitudeParams::default());
    scheduler.add_task(Viewpoint::new(1, 1, 1.7));
    let mut grid = Raster::new(10, 9);
    assert!(matches!(scheduler.run_into(&mut grid), Err(Error::SizeMismatch { .. })));
    assert_eq!(scheduler.pending().len(), 1);
}
