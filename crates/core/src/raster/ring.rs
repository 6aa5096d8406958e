//! Square rings of cells around an origin
//!
//! A ring of distance `d` is the boundary of the square of Chebyshev radius `d`
//! centred on an origin cell. Sweeps walk rings outward so that every cell is
//! visited after the cells between it and the origin.
//!
//! Enumeration order (each corner belongs to exactly one side):
//!
//! ```text
//!   T T T T R        T = top edge, left -> right (owns top-left corner)
//!   L . . . R        R = right edge, top -> bottom (owns top-right corner)
//!   L . o . R        B = bottom edge, right -> left (owns bottom-right corner)
//!   L . . . R        L = left edge, bottom -> top (owns bottom-left corner)
//!   L B B B B
//! ```
//!
//! A side whose line lies outside the grid is dropped as a whole. A side whose
//! line is inside the grid yields all of its in-bounds cells, so every in-bounds
//! cell at distance `d` appears exactly once.

/// Ordered in-bounds cells of the ring at `distance` around `origin`.
///
/// `shape` is `(rows, cols)`. Distance 0 has no ring and yields an empty vector.
pub fn ring_cells(shape: (usize, usize), origin: (usize, usize), distance: usize) -> Vec<(usize, usize)> {
    if distance == 0 || shape.0 == 0 || shape.1 == 0 || distance > farthest_reach(shape, origin) {
        return Vec::new();
    }

    let (rows, cols) = (shape.0 as isize, shape.1 as isize);
    let (r0, c0) = (origin.0 as isize, origin.1 as isize);
    let d = distance as isize;

    // A clipped ring never holds more than the grid perimeter.
    let mut ring = Vec::with_capacity((8 * distance).min(2 * (shape.0 + shape.1)));

    let top = r0 - d;
    let bottom = r0 + d;
    let left = c0 - d;
    let right = c0 + d;

    if top >= 0 {
        for c in left.max(0)..=(right - 1).min(cols - 1) {
            ring.push((top as usize, c as usize));
        }
    }

    if right < cols {
        for r in top.max(0)..=(bottom - 1).min(rows - 1) {
            ring.push((r as usize, right as usize));
        }
    }

    if bottom < rows {
        for c in ((left + 1).max(0)..=right.min(cols - 1)).rev() {
            ring.push((bottom as usize, c as usize));
        }
    }

    if left >= 0 {
        for r in ((top + 1).max(0)..=bottom.min(rows - 1)).rev() {
            ring.push((r as usize, left as usize));
        }
    }

    ring
}

/// Chebyshev distance from `origin` to the farthest grid corner
fn farthest_reach(shape: (usize, usize), origin: (usize, usize)) -> usize {
    let rows = origin.0.max(origin.0.abs_diff(shape.0 - 1));
    let cols = origin.1.max(origin.1.abs_diff(shape.1 - 1));
    rows.max(cols)
}

/// Iterator over `(distance, ring)` pairs around an origin.
///
/// Distances start at 1 and grow by one. Iteration ends at the first empty ring
/// (every side outside the grid) or after `max_radius` when it is non-zero.
#[derive(Debug, Clone)]
pub struct Rings {
    shape: (usize, usize),
    origin: (usize, usize),
    max_radius: usize,
    next_distance: usize,
    exhausted: bool,
}

impl Rings {
    /// Rings around `origin` in a grid of `shape`; `max_radius` 0 = unlimited
    pub fn new(shape: (usize, usize), origin: (usize, usize), max_radius: usize) -> Self {
        Self {
            shape,
            origin,
            max_radius,
            next_distance: 1,
            exhausted: false,
        }
    }
}

impl Iterator for Rings {
    type Item = (usize, Vec<(usize, usize)>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || (self.max_radius > 0 && self.next_distance > self.max_radius) {
            return None;
        }

        let distance = self.next_distance;
        let ring = ring_cells(self.shape, self.origin, distance);
        if ring.is_empty() {
            self.exhausted = true;
            return None;
        }

        self.next_distance += 1;
        Some((distance, ring))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn chebyshev(a: (usize, usize), b: (usize, usize)) -> usize {
        a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
    }

    #[test]
    fn test_interior_ring_has_8d_cells() {
        let origin = (10, 10);
        for d in 1..=5 {
            let ring = ring_cells((21, 21), origin, d);
            assert_eq!(ring.len(), 8 * d, "ring {} size", d);

            let unique: HashSet<_> = ring.iter().copied().collect();
            assert_eq!(unique.len(), ring.len(), "ring {} has duplicates", d);

            for &cell in &ring {
                assert_eq!(chebyshev(cell, origin), d, "cell {:?} not on ring {}", cell, d);
            }
        }
    }

    #[test]
    fn test_ring_order() {
        let ring = ring_cells((5, 5), (2, 2), 1);
        assert_eq!(
            ring,
            vec![
                (1, 1), (1, 2), // top, left -> right
                (1, 3), (2, 3), // right, top -> bottom
                (3, 3), (3, 2), // bottom, right -> left
                (3, 1), (2, 1), // left, bottom -> top
            ]
        );
    }

    #[test]
    fn test_corner_origin_drops_sides() {
        let ring = ring_cells((5, 5), (0, 0), 1);
        assert_eq!(ring, vec![(0, 1), (1, 1), (1, 0)]);
        assert!(ring.len() < 8);
    }

    #[test]
    fn test_cells_next_to_out_of_bounds_corner_are_kept() {
        // Right side at col 5 is outside a 5-column grid.
        let ring = ring_cells((5, 5), (2, 3), 2);
        assert_eq!(ring.len(), 11);
        assert!(ring.contains(&(0, 4)));
        assert!(ring.contains(&(4, 4)));
        for &cell in &ring {
            assert_eq!(chebyshev(cell, (2, 3)), 2);
        }
    }

    #[test]
    fn test_cumulative_rings_cover_grid_once() {
        for &(shape, origin) in &[((7, 9), (0, 0)), ((7, 9), (6, 8)), ((4, 11), (2, 1)), ((1, 6), (0, 3))] {
            let mut seen = HashSet::new();
            let mut last = 0;
            for (d, ring) in Rings::new(shape, origin, 0) {
                assert_eq!(d, last + 1, "distances must increase by one");
                last = d;
                for cell in ring {
                    assert!(seen.insert(cell), "cell {:?} enumerated twice", cell);
                }
            }
            assert!(seen.len() <= shape.0 * shape.1 - 1);
            assert_eq!(seen.len(), shape.0 * shape.1 - 1);
            assert!(!seen.contains(&origin));
        }
    }

    #[test]
    fn test_rings_stop_at_max_radius() {
        let distances: Vec<usize> = Rings::new((50, 50), (25, 25), 3).map(|(d, _)| d).collect();
        assert_eq!(distances, vec![1, 2, 3]);
    }

    #[test]
    fn test_single_cell_grid_has_no_rings() {
        assert_eq!(Rings::new((1, 1), (0, 0), 0).count(), 0);
        assert!(ring_cells((3, 3), (1, 1), 0).is_empty());
    }

    #[test]
    fn test_rings_beyond_the_grid_are_empty() {
        assert_eq!(ring_cells((5, 5), (2, 2), 2).len(), 16);
        assert!(ring_cells((5, 5), (2, 2), 3).is_empty());
        assert!(ring_cells((5, 5), (2, 2), usize::MAX).is_empty());
        assert!(ring_cells((5, 5), (0, 4), usize::MAX / 8 + 1).is_empty());
        // Farthest corner from (0, 4) in a 5x5 grid is 4 rings away.
        assert_eq!(ring_cells((5, 5), (0, 4), 4).len(), 9);
    }
}
