//! Visibility and visual magnitude
//!
//! One viewpoint is resolved by sweeping square rings outward from the
//! observer. Each cell's horizon is interpolated from two cells on the previous
//! ring (XDraw-style), so every cell is visited once and no ray is cast.
//!
//! - [`GeometryEngine`]: viewing slope, bearing, surface orientation and
//!   visual magnitude relative to one origin
//! - [`Orientation`]: the sixteen direction classes that select line-of-sight
//!   neighbours
//! - [`HorizonGrid`]: write-once running horizon per cell
//! - [`Sweep`]: the ring-by-ring state machine emitting [`Contribution`]s
//!
//! Reference:
//! Franklin, W.R. & Ray, C. (1994). Higher isn't necessarily better:
//! visibility algorithms and experiments. GIS/LIS.
//! Chamberlain, B.C. & Meitner, M.J. (2013). A route-based visibility analysis
//! for landscape management. Landscape and Urban Planning, 111, 13–24.

mod geometry;
mod horizon;
mod orientation;
mod params;
mod sweep;
mod viewshed;

pub use geometry::{GeometryEngine, LosNeighbors, EARTH_DIAMETER_M};
pub use horizon::HorizonGrid;
pub use orientation::Orientation;
pub use params::{viewpoints_from_mask, Viewpoint, VisualMagnitudeParams};
pub use sweep::{Contribution, Sweep, SweepStats};
pub use viewshed::{viewshed_magnitude, ViewpointRasters, VisualMagnitude};
