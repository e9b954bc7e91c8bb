//! Hex coordinate system using offset coordinates (x, y).
//!
//! Tiles are stored row by row. Odd rows are "shifted" half a tile to the
//! right, which gives the usual zig-zag layout:
//! - `HexCoord`: Identifies a tile by column and row
//! - `Direction`: One of the six neighbor directions
//! - `GridRect`: A rectangle of tiles, used for resizing and area queries
//!
//! Offset coordinates map directly onto the flat tile array, at the cost of
//! a parity-dependent neighbor table.

use serde::{Deserialize, Serialize};

/// Direction from a hex to one of its six neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Upper right neighbor
    NorthEast,
    /// Right neighbor
    East,
    /// Lower right neighbor
    SouthEast,
    /// Lower left neighbor
    SouthWest,
    /// Left neighbor
    West,
    /// Upper left neighbor
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order starting from NorthEast
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The direction pointing back the other way
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Column offsets per direction, indexed by row parity (even, odd).
const DX: [[i32; 6]; 2] = [[0, 1, 0, -1, -1, -1], [1, 1, 1, 0, -1, 0]];
/// Row offsets per direction, identical for both parities.
const DY: [i32; 6] = [-1, 0, 1, 1, 0, -1];

/// Offset coordinate of a tile.
///
/// - `x` is the column, increasing to the right
/// - `y` is the row, increasing downwards
/// - rows with odd `y` are shifted right by half a tile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this coordinate sits on a shifted (odd) row
    pub const fn is_shifted(&self) -> bool {
        self.y & 1 == 1
    }

    /// Get the neighbor in a specific direction
    pub const fn neighbor(&self, direction: Direction) -> HexCoord {
        let parity = (self.y & 1) as usize;
        let d = direction.index();
        HexCoord::new(self.x + DX[parity][d], self.y + DY[d])
    }

    /// The six neighboring hexes in clockwise order starting from NorthEast
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Whether `other` is one of the six neighbors
    pub fn is_adjacent(&self, other: &HexCoord) -> bool {
        self.distance_to(other) == 1
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let (aq, ar) = self.axial();
        let (bq, br) = other.axial();
        let dq = (aq - bq).abs();
        let dr = (ar - br).abs();
        let ds = ((aq + ar) - (bq + br)).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Translate by a column/row delta
    pub const fn offset(&self, dx: i32, dy: i32) -> HexCoord {
        HexCoord::new(self.x + dx, self.y + dy)
    }

    // Shifted rows lean right, so the axial column drops by one every two rows.
    fn axial(&self) -> (i32, i32) {
        let q = self.x - (self.y - (self.y & 1)) / 2;
        (q, self.y)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid dimensions in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of storage slots, including phantom columns
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Whether `pos` is a playable tile. Shifted rows lose their last column.
    pub const fn contains(&self, pos: HexCoord) -> bool {
        let row_width = self.width - pos.is_shifted() as i32;
        pos.x >= 0 && pos.y >= 0 && pos.y < self.height && pos.x < row_width
    }
}

/// A rectangle of tile coordinates.
///
/// Used both for resizing (relative to the old bounds) and for iterating a
/// sub-area of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl GridRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    pub const fn contains(&self, pos: HexCoord) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width
            && pos.y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_tables() {
        let even = HexCoord::new(2, 2);
        assert_eq!(
            even.neighbors(),
            [
                HexCoord::new(2, 1),
                HexCoord::new(3, 2),
                HexCoord::new(2, 3),
                HexCoord::new(1, 3),
                HexCoord::new(1, 2),
                HexCoord::new(1, 1),
            ]
        );

        let odd = HexCoord::new(2, 1);
        assert_eq!(
            odd.neighbors(),
            [
                HexCoord::new(3, 0),
                HexCoord::new(3, 1),
                HexCoord::new(3, 2),
                HexCoord::new(2, 2),
                HexCoord::new(1, 1),
                HexCoord::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_opposite_round_trip() {
        for y in 0..4 {
            for x in 0..4 {
                let pos = HexCoord::new(x, y);
                for dir in Direction::ALL {
                    assert_eq!(pos.neighbor(dir).neighbor(dir.opposite()), pos);
                }
            }
        }
    }

    #[test]
    fn test_distance() {
        let origin = HexCoord::new(2, 2);
        assert_eq!(origin.distance_to(&origin), 0);
        for n in origin.neighbors() {
            assert_eq!(origin.distance_to(&n), 1);
            assert!(origin.is_adjacent(&n));
        }
        assert_eq!(origin.distance_to(&HexCoord::new(4, 2)), 2);
        assert_eq!(origin.distance_to(&HexCoord::new(2, 0)), 2);
        assert_eq!(HexCoord::new(0, 0).distance_to(&HexCoord::new(0, 3)), 3);
    }

    #[test]
    fn test_rect_contains() {
        let rect = GridRect::new(1, 1, 2, 2);
        assert!(rect.contains(HexCoord::new(1, 1)));
        assert!(rect.contains(HexCoord::new(2, 2)));
        assert!(!rect.contains(HexCoord::new(3, 2)));
        assert!(!rect.contains(HexCoord::new(0, 1)));
    }
}
