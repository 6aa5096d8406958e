//! # VisMag Algorithms
//!
//! Visibility analysis for a single observer over a DEM.
//!
//! ## Available Algorithm Categories
//!
//! - **visibility**: ring-sweep viewshed with per-cell visual magnitude
//!   (geometry engine, orientation classes, horizon grid, sweep)

pub mod visibility;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::visibility::{
        viewpoints_from_mask, viewshed_magnitude, Contribution, GeometryEngine, HorizonGrid,
        Orientation, Sweep, SweepStats, Viewpoint, ViewpointRasters, VisualMagnitude,
        VisualMagnitudeParams,
    };
    pub use vismag_core::prelude::*;
}
