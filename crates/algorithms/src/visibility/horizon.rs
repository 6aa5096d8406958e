//! Running horizon per cell for one viewpoint

use vismag_core::raster::Raster;
use vismag_core::{Error, Result};

/// Write-once horizon angle per cell (degrees).
///
/// A cell is unresolved until the sweep reaches it. Omitted cells (the observer
/// and the excluded inner rings) hold [`HorizonGrid::OMITTED`], which never
/// blocks anything behind it.
#[derive(Debug, Clone)]
pub struct HorizonGrid {
    values: Raster<f64>,
}

impl HorizonGrid {
    /// Horizon of omitted cells
    pub const OMITTED: f64 = f64::NEG_INFINITY;

    /// All cells unresolved
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            values: Raster::filled(rows, cols, f64::NAN),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Resolved horizon of a cell, `None` while unresolved or out of bounds
    pub fn get(&self, cell: (usize, usize)) -> Option<f64> {
        self.values.get(cell.0, cell.1).ok().filter(|v| !v.is_nan())
    }

    pub fn is_resolved(&self, cell: (usize, usize)) -> bool {
        self.get(cell).is_some()
    }

    /// Mark a cell as excluded from evaluation
    pub fn stamp_omitted(&mut self, cell: (usize, usize)) -> Result<()> {
        self.resolve(cell, Self::OMITTED)
    }

    /// Store the final horizon of a cell. Each cell is written exactly once.
    pub fn resolve(&mut self, cell: (usize, usize), horizon: f64) -> Result<()> {
        if horizon.is_nan() {
            return Err(Error::Algorithm(format!(
                "NaN horizon for cell ({}, {})",
                cell.0, cell.1
            )));
        }
        let current = self.values.get(cell.0, cell.1)?;
        if !current.is_nan() {
            return Err(Error::Algorithm(format!(
                "horizon of cell ({}, {}) already resolved",
                cell.0, cell.1
            )));
        }
        self.values.set(cell.0, cell.1, horizon)
    }

    /// Number of resolved cells
    pub fn resolved_count(&self) -> usize {
        self.values.data().iter().filter(|v| !v.is_nan()).count()
    }

    /// Horizon raster; unresolved cells stay NaN
    pub fn into_raster(self) -> Raster<f64> {
        self.values
    }
}
