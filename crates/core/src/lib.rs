//! # VisMag Core
//!
//! Core types and traits shared by the VisMag crates.
//!
//! This crate provides:
//! - `Raster<T>`: generic raster grid type, used as the read-only elevation grid
//!   and as the accumulated output grid
//! - `GeoTransform`: cell size and placement of the grid
//! - Ring enumeration around an origin cell and the zero-padded 3x3 window
//! - `Error` / `Result` shared by every crate in the workspace
//! - Algorithm traits for consistent API

pub mod error;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{ElevationGrid, GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{ElevationGrid, GeoTransform, Raster, RasterElement, Rings};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in VisMag.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
