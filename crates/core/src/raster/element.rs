//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Elevation, horizon and magnitude grids use `f64`; visibility masks use `u8`.
/// `Zero` gives both the out-of-bounds value of the 3x3 window and the
/// starting value of an accumulation grid.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    nodata == Some(*self)
                }
            }
        )*
    };
}

macro_rules! impl_raster_element_float {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    if self.is_nan() {
                        return true;
                    }
                    match nodata {
                        Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                        None => false,
                    }
                }
            }
        )*
    };
}

impl_raster_element_int!(u8, u32, i32);
impl_raster_element_float!(f32, f64);
