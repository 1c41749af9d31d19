//! Grid geometry: cells, map bounds, keypad directions and Chebyshev distance.
//!
//! Coordinates are `(y, x)` = `(row, column)`. Directions use the numeric
//! keypad layout the host expects after a movement command (`8` is north,
//! `3` is south-east, `5` is "stay here").
use std::fmt;

/// Discrete map cell expressed as row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub y: i32,
    pub x: i32,
}

impl Cell {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Cell reached by taking one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dy, dx) = direction.delta();
        Self::new(self.y + dy, self.x + dx)
    }

    /// The 8 surrounding cells in [`Direction::SCAN`] order.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        Direction::SCAN.into_iter().map(move |dir| self.step(dir))
    }

    /// Chebyshev distance to `other`.
    pub fn distance(self, other: Cell) -> i32 {
        grid_distance(self.y, self.x, other.y, other.x)
    }

    /// True when both cells share a row or a column.
    pub fn is_orthogonal_to(self, other: Cell) -> bool {
        self.y == other.y || self.x == other.x
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

/// Grid (Chebyshev) distance between two points, ignoring obstacles.
///
/// `max(|y1 - y2|, |x1 - x2|)`: the number of king moves between the cells.
pub fn grid_distance(y1: i32, x1: i32, y2: i32, x2: i32) -> i32 {
    (y1 - y2).abs().max((x1 - x2).abs())
}

/// Map extent in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub height: u32,
    pub width: u32,
}

impl Dimensions {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.y >= 0 && cell.x >= 0 && cell.y < self.height as i32 && cell.x < self.width as i32
    }

    pub fn area(&self) -> usize {
        self.height as usize * self.width as usize
    }

    /// Row-major index of `cell`, or `None` when out of bounds.
    pub fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Every cell except the outermost ring.
    ///
    /// The border of a level is permanent rock, so scans that look for
    /// targets never need to visit it.
    pub fn interior(self) -> impl Iterator<Item = Cell> {
        let (height, width) = (self.height as i32, self.width as i32);
        (1..height - 1).flat_map(move |y| (1..width - 1).map(move |x| Cell::new(y, x)))
    }
}

/// One of the 8 compass directions, or "hold", labelled by keypad digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    SouthWest = 1,
    South = 2,
    SouthEast = 3,
    West = 4,
    Hold = 5,
    East = 6,
    NorthWest = 7,
    North = 8,
    NorthEast = 9,
}

impl Direction {
    /// Neighbour scan order: orthogonals first, then diagonals.
    ///
    /// Every "pick the best neighbour" loop walks this order and keeps the
    /// first of several equal candidates, so orthogonal steps win ties.
    pub const SCAN: [Direction; 8] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthEast,
        Direction::NorthWest,
    ];

    /// `(dy, dx)` offset of one step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::SouthWest => (1, -1),
            Direction::South => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::West => (0, -1),
            Direction::Hold => (0, 0),
            Direction::East => (0, 1),
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
        }
    }

    /// Keypad digit the host reads as this direction.
    pub const fn keypad(self) -> char {
        match self {
            Direction::SouthWest => '1',
            Direction::South => '2',
            Direction::SouthEast => '3',
            Direction::West => '4',
            Direction::Hold => '5',
            Direction::East => '6',
            Direction::NorthWest => '7',
            Direction::North => '8',
            Direction::NorthEast => '9',
        }
    }

    /// Inverse of [`Direction::keypad`].
    pub fn from_keypad(digit: char) -> Option<Self> {
        let direction = match digit {
            '1' => Direction::SouthWest,
            '2' => Direction::South,
            '3' => Direction::SouthEast,
            '4' => Direction::West,
            '5' => Direction::Hold,
            '6' => Direction::East,
            '7' => Direction::NorthWest,
            '8' => Direction::North,
            '9' => Direction::NorthEast,
            _ => return None,
        };
        Some(direction)
    }

    pub fn is_diagonal(self) -> bool {
        let (dy, dx) = self.delta();
        dy != 0 && dx != 0
    }
}
