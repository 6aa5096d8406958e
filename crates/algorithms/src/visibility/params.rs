//! Viewpoints and analysis parameters

use serde::{Deserialize, Serialize};
use vismag_core::raster::Raster;
use vismag_core::{Error, Result};

/// Default atmospheric refraction coefficient
pub(crate) const DEFAULT_REFRACTION: f64 = 0.13;

/// Observer location: a grid cell plus eye height above the terrain (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    /// Observer row position
    pub row: usize,
    /// Observer column position
    pub col: usize,
    /// Height added to the terrain elevation at the observer cell
    pub height_offset: f64,
}

impl Viewpoint {
    pub fn new(row: usize, col: usize, height_offset: f64) -> Self {
        Self {
            row,
            col,
            height_offset,
        }
    }

    /// (row, col) of the observer cell
    pub fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Reject viewpoints that fall outside `dem`
    pub fn check_bounds<T: vismag_core::RasterElement>(&self, dem: &Raster<T>) -> Result<()> {
        let (rows, cols) = dem.shape();
        if self.row >= rows || self.col >= cols {
            return Err(Error::IndexOutOfBounds {
                row: self.row,
                col: self.col,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

/// Parameters for visual magnitude analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualMagnitudeParams {
    /// Rings up to this Chebyshev distance are excluded from evaluation
    /// (default 0: only the observer cell is excluded)
    pub omitted_radius: usize,
    /// Maximum ring distance in cells (0 = unlimited)
    pub max_radius: usize,
    /// Atmospheric refraction coefficient applied to the curvature drop (default 0.13)
    pub refraction_coefficient: f64,
}

impl Default for VisualMagnitudeParams {
    fn default() -> Self {
        Self {
            omitted_radius: 0,
            max_radius: 0,
            refraction_coefficient: DEFAULT_REFRACTION,
        }
    }
}

impl VisualMagnitudeParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.refraction_coefficient) {
            return Err(Error::InvalidParameter {
                name: "refraction_coefficient",
                value: self.refraction_coefficient.to_string(),
                reason: "must lie in [0, 1]".into(),
            });
        }
        Ok(())
    }
}

/// Turn a path raster into viewpoints: every cell with a value > 0 becomes an
/// observer with `height_offset`. Cells are returned in row-major order.
pub fn viewpoints_from_mask<T: vismag_core::RasterElement>(
    mask: &Raster<T>,
    height_offset: f64,
) -> Vec<Viewpoint> {
    let mut viewpoints = Vec::new();
    for ((row, col), &value) in mask.data().indexed_iter() {
        if mask.is_nodata(value) {
            continue;
        }
        if value.to_f64().is_some_and(|v| v > 0.0) {
            viewpoints.push(Viewpoint::new(row, col, height_offset));
        }
    }
    viewpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bounds() {
        let dem = Raster::filled(10, 8, 0.0_f64);
        assert!(Viewpoint::new(9, 7, 1.7).check_bounds(&dem).is_ok());
        assert!(matches!(
            Viewpoint::new(10, 0, 1.7).check_bounds(&dem),
            Err(Error::IndexOutOfBounds { row: 10, .. })
        ));
        assert!(Viewpoint::new(0, 8, 1.7).check_bounds(&dem).is_err());
    }

    #[test]
    fn test_params_validation() {
        assert!(VisualMagnitudeParams::default().validate().is_ok());
        let bad = VisualMagnitudeParams {
            refraction_coefficient: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let nan = VisualMagnitudeParams {
            refraction_coefficient: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_viewpoints_from_mask() {
        let mut mask: Raster<u8> = Raster::new(4, 4);
        mask.set(0, 3, 1).unwrap();
        mask.set(2, 1, 5).unwrap();
        mask.set(3, 3, 9).unwrap();
        mask.set_nodata(Some(9));

        let viewpoints = viewpoints_from_mask(&mask, 1.8);
        assert_eq!(
            viewpoints,
            vec![Viewpoint::new(0, 3, 1.8), Viewpoint::new(2, 1, 1.8)]
        );
    }
}
