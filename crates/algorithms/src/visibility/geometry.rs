//! Geometry relative to one observer
//!
//! Angles are in degrees. Bearings are compass bearings (0 = North, clockwise,
//! rows grow southward). 3D vectors are (east, north, up).

use std::f64::consts::{FRAC_PI_2, SQRT_2};

use vismag_core::raster::{ElevationGrid, Window3x3};
use vismag_core::{Error, Result};

use super::orientation::Orientation;
use super::params::{Viewpoint, VisualMagnitudeParams};

/// Earth diameter used for the curvature drop `d² / D` (meters)
pub const EARTH_DIAMETER_M: f64 = 12_740_000.0;

/// Gradient magnitude below which a cell is treated as flat
const FLAT_THRESHOLD: f64 = 1e-10;

/// The two previously resolved cells whose horizons bracket a cell's line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LosNeighbors {
    /// One step back along the dominant axis
    pub adjacent: (usize, usize),
    /// One diagonal step back toward the observer
    pub offset: (usize, usize),
}

/// Per-viewpoint geometry over a shared elevation grid.
#[derive(Debug, Clone)]
pub struct GeometryEngine<'a> {
    dem: &'a ElevationGrid,
    origin: (usize, usize),
    /// Terrain elevation at the origin plus the observer height
    origin_elevation: f64,
    cell_size: f64,
    refraction: f64,
}

impl<'a> GeometryEngine<'a> {
    /// Bind an engine to `viewpoint`.
    ///
    /// Fails if the viewpoint is outside the grid or stands on a NaN cell.
    pub fn new(dem: &'a ElevationGrid, viewpoint: &Viewpoint, params: &VisualMagnitudeParams) -> Result<Self> {
        dem.validate()?;
        params.validate()?;
        viewpoint.check_bounds(dem)?;

        let ground = dem.get(viewpoint.row, viewpoint.col)?;
        if ground.is_nan() {
            return Err(Error::Algorithm("Observer is on NaN cell".into()));
        }

        Ok(Self {
            dem,
            origin: viewpoint.cell(),
            origin_elevation: ground + viewpoint.height_offset,
            cell_size: dem.cell_size(),
            refraction: params.refraction_coefficient,
        })
    }

    /// Grid the engine reads from
    pub fn dem(&self) -> &'a ElevationGrid {
        self.dem
    }

    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Observer eye elevation
    pub fn origin_elevation(&self) -> f64 {
        self.origin_elevation
    }

    /// Terrain elevation of the cell; NaN marks no-data.
    pub fn elevation(&self, cell: (usize, usize)) -> Result<f64> {
        self.dem.get(cell.0, cell.1)
    }

    /// (Δrow, Δcol) from the origin in cells
    pub fn offset_of(&self, cell: (usize, usize)) -> (isize, isize) {
        (
            cell.0 as isize - self.origin.0 as isize,
            cell.1 as isize - self.origin.1 as isize,
        )
    }

    /// Ground distance from the origin (meters)
    pub fn planar_distance(&self, cell: (usize, usize)) -> f64 {
        let (dr, dc) = self.offset_of(cell);
        (dr as f64).hypot(dc as f64) * self.cell_size
    }

    /// Elevation difference cell − observer after the curvature drop,
    /// partly compensated by refraction.
    fn adjusted_rise(&self, cell: (usize, usize), planar: f64) -> Result<f64> {
        let curvature = planar * planar / EARTH_DIAMETER_M;
        Ok(self.elevation(cell)? - curvature + self.refraction * curvature - self.origin_elevation)
    }

    /// Straight-line distance from the observer eye to the cell (meters)
    pub fn distance(&self, cell: (usize, usize)) -> Result<f64> {
        let planar = self.planar_distance(cell);
        Ok(planar.hypot(self.adjusted_rise(cell, planar)?))
    }

    /// Vertical angle from the observer to the cell, relative to the horizontal
    pub fn viewing_slope(&self, cell: (usize, usize)) -> Result<f64> {
        let planar = self.planar_distance(cell);
        Ok(self.adjusted_rise(cell, planar)?.atan2(planar).to_degrees())
    }

    /// Compass bearing from the origin to the cell, in [0, 360)
    pub fn bearing(&self, cell: (usize, usize)) -> f64 {
        let (dr, dc) = self.offset_of(cell);
        compass_bearing(dc as f64, -(dr as f64))
    }

    /// West–east and north–south gradient components of the cell surface.
    ///
    /// Positive west–east means the west side is higher; positive
    /// north–south means the north side is higher.
    pub fn slope_components(&self, cell: (usize, usize)) -> (f64, f64) {
        let w = self.dem.window_3x3(cell.0, cell.1);
        gradient(&w, self.cell_size)
    }

    /// Slope angle of the cell surface; 0 for flat or undefined surfaces
    pub fn cell_slope(&self, cell: (usize, usize)) -> f64 {
        let (we, ns) = self.slope_components(cell);
        let magnitude = we.hypot(ns);
        if magnitude.is_finite() {
            magnitude.atan().to_degrees()
        } else {
            0.0
        }
    }

    /// Compass bearing the cell surface faces (downslope direction).
    ///
    /// `None` when the surface is flat or the window holds no-data.
    pub fn cell_aspect(&self, cell: (usize, usize)) -> Option<f64> {
        let (we, ns) = self.slope_components(cell);
        let magnitude = we.hypot(ns);
        if !magnitude.is_finite() || magnitude < FLAT_THRESHOLD {
            return None;
        }
        Some(compass_bearing(we, -ns))
    }

    /// Visual magnitude of the cell as seen from the observer.
    ///
    /// Zero when the surface is flat or turned away from the observer;
    /// otherwise `cell² / distance² · |cos θ|` where θ is the angle between
    /// the viewing direction and the surface normal.
    pub fn visual_magnitude(&self, cell: (usize, usize)) -> Result<f64> {
        let viewing_slope = self.viewing_slope(cell)?;
        let Some(aspect) = self.cell_aspect(cell) else {
            return Ok(0.0);
        };
        let slope = self.cell_slope(cell);

        let view = unit_vector(self.bearing(cell), viewing_slope);
        // Normal leans away from the zenith by the slope angle, toward the aspect.
        let normal = unit_vector(aspect, 90.0 - slope);

        let cos_angle = dot(view, normal).clamp(-1.0, 1.0);
        if cos_angle.acos() <= FRAC_PI_2 {
            return Ok(0.0);
        }

        let distance = self.distance(cell)?;
        Ok((self.cell_size * self.cell_size) / (distance * distance) * cos_angle.abs())
    }

    /// Line-of-sight neighbours of `cell`; `None` for the origin itself.
    pub fn los_neighbors(&self, cell: (usize, usize)) -> Option<LosNeighbors> {
        let (dr, dc) = self.offset_of(cell);
        let [adjacent, offset] = Orientation::classify(dr, dc)?.neighbor_offsets();
        let step = |(odr, odc): (isize, isize)| {
            ((cell.0 as isize + odr) as usize, (cell.1 as isize + odc) as usize)
        };
        Some(LosNeighbors {
            adjacent: step(adjacent),
            offset: step(offset),
        })
    }

    /// Weight of the adjacent neighbour's horizon when blending the two
    /// line-of-sight neighbours; the offset neighbour gets `1 − weight`.
    ///
    /// The neighbour whose bearing is closer to the cell's bearing weighs more.
    /// Returns 1 when both bearing differences vanish.
    pub fn interpolation_weight(&self, cell: (usize, usize)) -> f64 {
        let Some(neighbors) = self.los_neighbors(cell) else {
            return 1.0;
        };
        if neighbors.adjacent == neighbors.offset {
            return 1.0;
        }
        let bearing = self.bearing(cell);
        let to_adjacent = angular_difference(self.bearing(neighbors.adjacent), bearing);
        let to_offset = angular_difference(self.bearing(neighbors.offset), bearing);

        let total = to_adjacent + to_offset;
        if total == 0.0 {
            1.0
        } else {
            (to_offset / total).clamp(0.0, 1.0)
        }
    }
}

/// Weighted finite differences over a 3x3 window, diagonal weight √2.
fn gradient(w: &Window3x3<f64>, cell_size: f64) -> (f64, f64) {
    let norm = 8.0 * cell_size;
    let west = SQRT_2 * w.at(-1, -1) + w.at(0, -1) + SQRT_2 * w.at(1, -1);
    let east = SQRT_2 * w.at(-1, 1) + w.at(0, 1) + SQRT_2 * w.at(1, 1);
    let north = SQRT_2 * w.at(-1, -1) + w.at(-1, 0) + SQRT_2 * w.at(-1, 1);
    let south = SQRT_2 * w.at(1, -1) + w.at(1, 0) + SQRT_2 * w.at(1, 1);
    ((west - east) / norm, (north - south) / norm)
}

/// Compass bearing of an (east, north) direction, in [0, 360)
fn compass_bearing(east: f64, north: f64) -> f64 {
    east.atan2(north).to_degrees().rem_euclid(360.0)
}

/// Smallest absolute difference between two bearings, in [0, 180]
fn angular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Unit (east, north, up) vector for a bearing and an elevation angle
fn unit_vector(bearing: f64, elevation: f64) -> [f64; 3] {
    let (sin_b, cos_b) = bearing.to_radians().sin_cos();
    let (sin_e, cos_e) = elevation.to_radians().sin_cos();
    [sin_b * cos_e, cos_b * cos_e, sin_e]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
