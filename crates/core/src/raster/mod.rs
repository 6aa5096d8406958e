//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
mod neighborhood;
mod ring;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{ElevationGrid, Raster, RasterStatistics};
pub use neighborhood::{Neighborhood, Window3x3};
pub use ring::{ring_cells, Rings};
