//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients for placing a raster on the ground.
///
/// The visibility engine only needs the ground distance covered by one cell,
/// so rotation terms are not carried. Cells are assumed square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new north-up GeoTransform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// North-up transform anchored at the origin with square cells of `cell_size`
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self::new(0.0, 0.0, cell_size, -cell_size)
    }

    /// Get the cell size (ground distance per cell)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
