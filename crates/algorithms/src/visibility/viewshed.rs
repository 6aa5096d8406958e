//! Single-viewpoint visual magnitude
//!
//! Runs one [`Sweep`] and materialises its results as rasters: a 0/1
//! visibility mask, the per-cell visual magnitude and the line-of-sight
//! horizon angle.

use vismag_core::raster::{ElevationGrid, Raster};
use vismag_core::{Algorithm, Error, Result};

use super::params::{Viewpoint, VisualMagnitudeParams};
use super::sweep::{Sweep, SweepStats};

/// Rasters produced for a single viewpoint
#[derive(Debug, Clone)]
pub struct ViewpointRasters {
    /// 1 = visible (observer included), 0 = occluded, omitted or beyond range
    pub visibility: Raster<u8>,
    /// Visual magnitude of visible cells, 0 elsewhere
    pub magnitude: Raster<f64>,
    /// Horizon angle in degrees; `-inf` for omitted cells, NaN beyond `max_radius`
    pub horizon: Raster<f64>,
    pub stats: SweepStats,
}

/// Compute visibility and visual magnitude from a single viewpoint
///
/// # Arguments
/// * `dem` - Input DEM
/// * `viewpoint` - Observer cell and eye height
/// * `params` - Omitted radius, maximum radius and refraction
///
/// # Returns
/// [`ViewpointRasters`] with the same shape and transform as `dem`
pub fn viewshed_magnitude(
    dem: &ElevationGrid,
    viewpoint: Viewpoint,
    params: VisualMagnitudeParams,
) -> Result<ViewpointRasters> {
    let (rows, cols) = dem.shape();
    let mut visibility = dem.with_same_meta::<u8>(rows, cols);
    let mut magnitude = dem.with_same_meta::<f64>(rows, cols);

    let mut sweep = Sweep::new(dem, &viewpoint, &params)?;
    let mut write_error: Option<Error> = None;
    let stats = sweep.run(|c| {
        if write_error.is_some() {
            return;
        }
        let written = visibility
            .set(c.row, c.col, 1)
            .and_then(|_| magnitude.set(c.row, c.col, c.magnitude));
        if let Err(e) = written {
            write_error = Some(e);
        }
    })?;
    if let Some(e) = write_error {
        return Err(e);
    }
    visibility.set(viewpoint.row, viewpoint.col, 1)?;

    let mut horizon = sweep.into_horizon().into_raster();
    horizon.set_transform(*dem.transform());

    Ok(ViewpointRasters {
        visibility,
        magnitude,
        horizon,
        stats,
    })
}

/// Visual magnitude from one viewpoint as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct VisualMagnitude;

impl Algorithm for VisualMagnitude {
    type Input = (ElevationGrid, Viewpoint);
    type Output = ViewpointRasters;
    type Params = VisualMagnitudeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Visual Magnitude"
    }

    fn description(&self) -> &'static str {
        "Visibility and visual magnitude of every cell from one viewpoint (ring sweep)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (dem, viewpoint) = input;
        viewshed_magnitude(&dem, viewpoint, params)
    }
}
