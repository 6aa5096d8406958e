//! Direction classes relative to the observer
//!
//! A cell's offset (Δrow, Δcol) from the observer falls into one of sixteen
//! classes: the eight compass axes/diagonals and the eight wedges between them.
//! Each class names the two cells, one ring closer to the observer, whose
//! horizons bracket this cell's line of sight:
//!
//! - the *adjacent* cell: one step back along the dominant axis
//! - the *offset* cell: one diagonal step back toward the observer
//!
//! On an axis or a diagonal both collapse onto the same cell.

use std::cmp::Ordering;

/// Direction class of a cell relative to the observer (rows grow southward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    North,
    NorthNorthEast,
    NorthEast,
    EastNorthEast,
    East,
    EastSouthEast,
    SouthEast,
    SouthSouthEast,
    South,
    SouthSouthWest,
    SouthWest,
    WestSouthWest,
    West,
    WestNorthWest,
    NorthWest,
    NorthNorthWest,
}

impl Orientation {
    /// All classes, clockwise from north
    pub const ALL: [Orientation; 16] = [
        Orientation::North,
        Orientation::NorthNorthEast,
        Orientation::NorthEast,
        Orientation::EastNorthEast,
        Orientation::East,
        Orientation::EastSouthEast,
        Orientation::SouthEast,
        Orientation::SouthSouthEast,
        Orientation::South,
        Orientation::SouthSouthWest,
        Orientation::SouthWest,
        Orientation::WestSouthWest,
        Orientation::West,
        Orientation::WestNorthWest,
        Orientation::NorthWest,
        Orientation::NorthNorthWest,
    ];

    /// Classify an offset from the observer. The observer itself has no class.
    pub fn classify(drow: isize, dcol: isize) -> Option<Self> {
        use Ordering::{Equal, Greater, Less};
        use Orientation::*;

        // (row sign, col sign, |Δrow| vs |Δcol|)
        let class = match (drow.cmp(&0), dcol.cmp(&0), drow.abs().cmp(&dcol.abs())) {
            (Equal, Equal, _) => return None,
            (Less, Equal, _) => North,
            (Equal, Greater, _) => East,
            (Greater, Equal, _) => South,
            (Equal, Less, _) => West,

            (Less, Greater, Greater) => NorthNorthEast,
            (Less, Greater, Equal) => NorthEast,
            (Less, Greater, Less) => EastNorthEast,

            (Greater, Greater, Less) => EastSouthEast,
            (Greater, Greater, Equal) => SouthEast,
            (Greater, Greater, Greater) => SouthSouthEast,

            (Greater, Less, Greater) => SouthSouthWest,
            (Greater, Less, Equal) => SouthWest,
            (Greater, Less, Less) => WestSouthWest,

            (Less, Less, Less) => WestNorthWest,
            (Less, Less, Equal) => NorthWest,
            (Less, Less, Greater) => NorthNorthWest,
        };
        Some(class)
    }

    /// Offsets `[adjacent, offset]` from a cell of this class to its two
    /// line-of-sight neighbours.
    pub fn neighbor_offsets(self) -> [(isize, isize); 2] {
        use Orientation::*;

        match self {
            North => [(1, 0), (1, 0)],
            NorthNorthEast => [(1, 0), (1, -1)],
            NorthEast => [(1, -1), (1, -1)],
            EastNorthEast => [(0, -1), (1, -1)],
            East => [(0, -1), (0, -1)],
            EastSouthEast => [(0, -1), (-1, -1)],
            SouthEast => [(-1, -1), (-1, -1)],
            SouthSouthEast => [(-1, 0), (-1, -1)],
            South => [(-1, 0), (-1, 0)],
            SouthSouthWest => [(-1, 0), (-1, 1)],
            SouthWest => [(-1, 1), (-1, 1)],
            WestSouthWest => [(0, 1), (-1, 1)],
            West => [(0, 1), (0, 1)],
            WestNorthWest => [(0, 1), (1, 1)],
            NorthWest => [(1, 1), (1, 1)],
            NorthNorthWest => [(1, 0), (1, 1)],
        }
    }

    /// Whether the class lies exactly on an axis or a diagonal
    pub fn is_ray(self) -> bool {
        let [adjacent, offset] = self.neighbor_offsets();
        adjacent == offset
    }
}
