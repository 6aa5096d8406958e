//! Ring-by-ring visibility sweep for one viewpoint

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vismag_core::raster::ElevationGrid;
use vismag_core::{Error, Result};

use super::geometry::GeometryEngine;
use super::horizon::HorizonGrid;
use super::params::{Viewpoint, VisualMagnitudeParams};

/// Visual magnitude of one visible cell as seen from one viewpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub row: usize,
    pub col: usize,
    pub magnitude: f64,
}

/// Cell counters of a finished sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    /// Rings generated, omitted ones included
    pub rings: usize,
    pub visible: usize,
    pub occluded: usize,
    /// Observer cell plus the cells inside the omitted radius
    pub omitted: usize,
}

impl SweepStats {
    /// Cells that received a horizon
    pub fn resolved(&self) -> usize {
        self.visible + self.occluded + self.omitted
    }
}

impl AddAssign for SweepStats {
    fn add_assign(&mut self, other: Self) {
        self.rings += other.rings;
        self.visible += other.visible;
        self.occluded += other.occluded;
        self.omitted += other.omitted;
    }
}

/// Visibility state machine for a single viewpoint.
///
/// Rings are resolved in strictly increasing distance. Every cell's two
/// line-of-sight neighbours lie on the previous ring, so they are always
/// resolved when the cell is reached. A sweep runs once; the horizon grid is
/// write-once and rejects a second pass.
pub struct Sweep<'a> {
    geometry: GeometryEngine<'a>,
    horizon: HorizonGrid,
    omitted_radius: usize,
    max_radius: usize,
}

impl<'a> Sweep<'a> {
    pub fn new(dem: &'a ElevationGrid, viewpoint: &Viewpoint, params: &VisualMagnitudeParams) -> Result<Self> {
        let geometry = GeometryEngine::new(dem, viewpoint, params)?;
        let (rows, cols) = dem.shape();
        Ok(Self {
            geometry,
            horizon: HorizonGrid::new(rows, cols),
            omitted_radius: params.omitted_radius,
            max_radius: params.max_radius,
        })
    }

    pub fn geometry(&self) -> &GeometryEngine<'a> {
        &self.geometry
    }

    pub fn horizon(&self) -> &HorizonGrid {
        &self.horizon
    }

    /// Resolve every ring, calling `emit` once per visible cell.
    pub fn run<F>(&mut self, mut emit: F) -> Result<SweepStats>
    where
        F: FnMut(Contribution),
    {
        let mut stats = SweepStats::default();

        self.horizon.stamp_omitted(self.geometry.origin())?;
        stats.omitted += 1;

        let rings = self.geometry.dem().rings(self.geometry.origin(), self.max_radius);
        for (distance, ring) in rings {
            stats.rings += 1;

            if distance <= self.omitted_radius {
                for cell in ring {
                    self.horizon.stamp_omitted(cell)?;
                    stats.omitted += 1;
                }
                continue;
            }

            for cell in ring {
                let interpolated = self.interpolated_horizon(cell)?;
                let elevation = self.geometry.elevation(cell)?;
                let slope = self.geometry.viewing_slope(cell)?;

                if !elevation.is_nan() && slope >= interpolated {
                    self.horizon.resolve(cell, slope)?;
                    stats.visible += 1;
                    emit(Contribution {
                        row: cell.0,
                        col: cell.1,
                        magnitude: self.geometry.visual_magnitude(cell)?,
                    });
                } else {
                    self.horizon.resolve(cell, interpolated)?;
                    stats.occluded += 1;
                }
            }
        }

        debug!(
            origin = ?self.geometry.origin(),
            rings = stats.rings,
            visible = stats.visible,
            occluded = stats.occluded,
            omitted = stats.omitted,
            "sweep finished"
        );
        Ok(stats)
    }

    /// Blend of the two line-of-sight neighbours' stored horizons
    fn interpolated_horizon(&self, cell: (usize, usize)) -> Result<f64> {
        let neighbors = self
            .geometry
            .los_neighbors(cell)
            .ok_or_else(|| Error::Algorithm("origin reached the interpolation step".into()))?;

        let lookup = |n: (usize, usize)| {
            self.horizon.get(n).ok_or_else(|| {
                Error::Algorithm(format!(
                    "line-of-sight neighbour ({}, {}) of cell ({}, {}) is unresolved",
                    n.0, n.1, cell.0, cell.1
                ))
            })
        };
        let adjacent = lookup(neighbors.adjacent)?;
        let offset = lookup(neighbors.offset)?;

        Ok(blend(adjacent, offset, self.geometry.interpolation_weight(cell)))
    }

    pub fn into_horizon(self) -> HorizonGrid {
        self.horizon
    }
}

/// `a·w + b·(1 − w)` that never multiplies the omitted sentinel by zero
fn blend(a: f64, b: f64, w: f64) -> f64 {
    if w >= 1.0 {
        a
    } else if w <= 0.0 {
        b
    } else {
        a * w + b * (1.0 - w)
    }
}
