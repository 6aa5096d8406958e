//! Neighborhood operations for raster analysis

/// Defines a square neighborhood pattern around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// 3x3 neighborhood (8 neighbors + center)
    Queen3x3,
}

impl Neighborhood {
    /// Get the radius of the neighborhood
    pub fn radius(&self) -> usize {
        match self {
            Neighborhood::Queen3x3 => 1,
        }
    }

    /// Get the size of the neighborhood (width and height)
    pub fn size(&self) -> usize {
        self.radius() * 2 + 1
    }

    /// Relative positions in this neighborhood, row-major, center included
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        let mut offsets = Vec::with_capacity(self.size() * self.size());

        for dr in -r..=r {
            for dc in -r..=r {
                offsets.push((dr, dc));
            }
        }

        offsets
    }
}

/// Values of a 3x3 window, indexed `[row][col]` with the center at `[1][1]`.
///
/// Row 0 is the northern row and column 0 the western column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window3x3<T>(pub [[T; 3]; 3]);

impl<T: Copy> Window3x3<T> {
    /// Value at offset (dr, dc) from the center, each in -1..=1
    pub fn at(&self, dr: isize, dc: isize) -> T {
        self.0[(dr + 1) as usize][(dc + 1) as usize]
    }

    /// Center value
    pub fn center(&self) -> T {
        self.0[1][1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_offsets() {
        let queen = Neighborhood::Queen3x3;
        assert_eq!(queen.offsets().len(), 9);
        assert_eq!(queen.offsets()[0], (-1, -1));
        assert_eq!(queen.offsets()[4], (0, 0));
        assert_eq!(queen.size(), 3);
    }

    #[test]
    fn test_window_access() {
        let w = Window3x3([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        assert_eq!(w.center(), 5);
        assert_eq!(w.at(-1, -1), 1);
        assert_eq!(w.at(1, 0), 8);
    }
}
