//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Neighborhood, RasterElement, Rings, Window3x3};
use ndarray::Array2;

/// A 2D raster grid with its cell size.
///
/// `Raster<T>` stores values of type `T` in a row-major grid. The same type
/// serves as the immutable elevation input, the per-viewpoint horizon and
/// visibility layers, and the accumulated magnitude output.
///
/// # Example
///
/// ```ignore
/// use vismag_core::Raster;
///
/// let mut raster: Raster<f64> = Raster::new(100, 100);
/// raster.set(10, 20, 42.0)?;
/// let value = raster.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// No-data value
    nodata: Option<T>,
}

/// Elevation model: one `f64` height per cell plus the ground distance per cell.
///
/// Never mutated once handed to an analysis; workers share it by reference.
pub type ElevationGrid = Raster<f64>;

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a raster from existing row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a zeroed raster with the same transform but a different data type
    pub fn with_same_meta<U: RasterElement>(&self, rows: usize, cols: usize) -> Raster<U> {
        Raster {
            data: Array2::zeros((rows, cols)),
            transform: self.transform,
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a signed (row, col) position lies inside the grid
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        *cell = value;
        Ok(())
    }

    /// Add `value` to the cell at (row, col).
    ///
    /// Accumulation grids are only ever changed through this method, so a
    /// grid that already holds a partial result can keep receiving sums.
    pub fn accumulate(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        *cell = *cell + value;
        Ok(())
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        let (rows, cols) = self.shape();
        self.data.get_mut((row, col)).ok_or(Error::IndexOutOfBounds {
            row,
            col,
            rows,
            cols,
        })
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Check that the grid can be analysed at all.
    ///
    /// A zero-sized grid or an unusable cell size is fatal for the whole run.
    pub fn validate(&self) -> Result<()> {
        if self.rows() == 0 || self.cols() == 0 {
            return Err(Error::InvalidDimensions {
                width: self.cols(),
                height: self.rows(),
            });
        }
        let cell_size = self.cell_size();
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: "must be a positive finite ground distance".into(),
            });
        }
        Ok(())
    }

    // Neighborhoods

    /// 3x3 window of values centred on (row, col).
    ///
    /// Positions outside the grid read as zero, not as no-data.
    pub fn window_3x3(&self, row: usize, col: usize) -> Window3x3<T> {
        let mut window = [[T::zero(); 3]; 3];
        for (dr, dc) in Neighborhood::Queen3x3.offsets() {
            let r = row as isize + dr;
            let c = col as isize + dc;
            if self.contains(r, c) {
                window[(dr + 1) as usize][(dc + 1) as usize] =
                    unsafe { self.get_unchecked(r as usize, c as usize) };
            }
        }
        Window3x3(window)
    }

    /// Ordered boundary cells of the square of Chebyshev radius `distance`
    /// around `origin`. See [`ring_cells`](crate::raster::ring_cells).
    pub fn ring(&self, origin: (usize, usize), distance: usize) -> Vec<(usize, usize)> {
        super::ring_cells(self.shape(), origin, distance)
    }

    /// Rings around `origin` from distance 1 outward; `max_radius` 0 = unlimited.
    pub fn rings(&self, origin: (usize, usize), max_radius: usize) -> Rings {
        Rings::new(self.shape(), origin, max_radius)
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }

            if min.is_none_or(|m| value < m) {
                min = Some(value);
            }
            if max.is_none_or(|m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
