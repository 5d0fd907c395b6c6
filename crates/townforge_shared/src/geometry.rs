//! Tile geometry shared by the road generator and the building placer.
//!
//! All coordinates are integer tile positions on the `x`/`z` ground plane.
//! North points towards negative `z`, east towards positive `x`.

use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// One of the eight compass directions a road can leave a tile in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards negative z
    North = 0,
    /// Towards positive z
    South = 1,
    /// Towards positive x
    East = 2,
    /// Towards negative x
    West = 3,
    /// North + East
    Northeast = 4,
    /// South + East
    Southeast = 5,
    /// South + West
    Southwest = 6,
    /// North + West
    Northwest = 7,
}

impl Direction {
    /// The four axis-aligned directions, in the order walks enumerate them.
    pub const CARDINALS: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the direction pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Northeast => Self::Southwest,
            Self::Southeast => Self::Northwest,
            Self::Southwest => Self::Northeast,
            Self::Northwest => Self::Southeast,
        }
    }

    /// Returns the `(left, right)` directions perpendicular to this one.
    ///
    /// Left and right are taken as seen when travelling in `self`.
    #[inline]
    #[must_use]
    pub const fn perpendicular_pair(self) -> (Self, Self) {
        match self {
            Self::North => (Self::West, Self::East),
            Self::South => (Self::East, Self::West),
            Self::East => (Self::North, Self::South),
            Self::West => (Self::South, Self::North),
            Self::Northeast => (Self::Northwest, Self::Southeast),
            Self::Southeast => (Self::Northeast, Self::Southwest),
            Self::Southwest => (Self::Southeast, Self::Northwest),
            Self::Northwest => (Self::Southwest, Self::Northeast),
        }
    }

    /// Unit offset `(dx, dz)` of one step in this direction.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Northeast => (1, -1),
            Self::Southeast => (1, 1),
            Self::Southwest => (-1, 1),
            Self::Northwest => (-1, -1),
        }
    }

    /// Returns true for north, south, east and west.
    #[inline]
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        matches!(self, Self::North | Self::South | Self::East | Self::West)
    }

    /// Returns true for directions that move along the x axis only.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// The two diagonals that keep moving in this direction.
    ///
    /// A diagonal continues only as itself.
    #[must_use]
    pub const fn diagonal_continuations(self) -> [Self; 2] {
        match self {
            Self::North => [Self::Northwest, Self::Northeast],
            Self::South => [Self::Southeast, Self::Southwest],
            Self::East => [Self::Northeast, Self::Southeast],
            Self::West => [Self::Southwest, Self::Northwest],
            diagonal => [diagonal, diagonal],
        }
    }

    /// Dominant cardinal direction of the offset `(dx, dz)`.
    ///
    /// Ties favour the x axis; a zero offset yields `None`.
    #[must_use]
    pub const fn dominant(dx: i32, dz: i32) -> Option<Self> {
        if dx == 0 && dz == 0 {
            return None;
        }
        if dx.abs() >= dz.abs() {
            Some(if dx > 0 { Self::East } else { Self::West })
        } else {
            Some(if dz > 0 { Self::South } else { Self::North })
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
            Self::Northeast => "NE",
            Self::Southeast => "SE",
            Self::Southwest => "SW",
            Self::Northwest => "NW",
        };
        f.write_str(name)
    }
}

/// Which two sides a corner road piece joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerDirection {
    /// Joins the north and east sides
    NE,
    /// Joins the north and west sides
    NW,
    /// Joins the south and east sides
    SE,
    /// Joins the south and west sides
    SW,
}

impl CornerDirection {
    /// Corner for a road arriving from `from` and turning towards `to`.
    ///
    /// The quadrant is the sign of the summed step vectors. When the sum
    /// cancels on an axis, the turn direction decides, then the arrival
    /// direction, then east/south.
    #[must_use]
    pub const fn from_turn(from: Direction, to: Direction) -> Self {
        let (fx, fz) = from.delta();
        let (tx, tz) = to.delta();
        let east = resolve_sign(fx + tx, tx, fx);
        let south = resolve_sign(fz + tz, tz, fz);
        match (east, south) {
            (true, true) => Self::SE,
            (true, false) => Self::NE,
            (false, true) => Self::SW,
            (false, false) => Self::NW,
        }
    }
}

/// First non-zero sign of the candidates, positive when all are zero.
const fn resolve_sign(primary: i32, secondary: i32, tertiary: i32) -> bool {
    if primary != 0 {
        primary > 0
    } else if secondary != 0 {
        secondary > 0
    } else {
        tertiary >= 0
    }
}

/// Integer tile coordinate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    /// X tile coordinate
    pub x: i32,
    /// Z tile coordinate
    pub z: i32,
}

impl Point {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The tile one step away in `direction`, clamped to the `i32` range.
    ///
    /// At the edge of the coordinate range the clamped axis stays put, so the
    /// result can equal `self`. Use [`Self::checked_step`] to detect that.
    #[inline]
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// The tile one step away in `direction`, or `None` past the `i32` range.
    #[inline]
    #[must_use]
    pub const fn checked_step(self, direction: Direction) -> Option<Self> {
        let (dx, dz) = direction.delta();
        match (self.x.checked_add(dx), self.z.checked_add(dz)) {
            (Some(x), Some(z)) => Some(Self::new(x, z)),
            _ => None,
        }
    }

    /// The tile `count` steps away in `direction`, clamped to the `i32` range.
    #[inline]
    #[must_use]
    pub const fn offset(self, direction: Direction, count: i32) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(
            self.x.saturating_add(dx.saturating_mul(count)),
            self.z.saturating_add(dz.saturating_mul(count)),
        )
    }

    /// The four axis-aligned neighbours, north, east, south, west.
    #[must_use]
    pub const fn cardinal_neighbors(self) -> [Self; 4] {
        [
            self.step(Direction::North),
            self.step(Direction::East),
            self.step(Direction::South),
            self.step(Direction::West),
        ]
    }

    /// Euclidean distance to another tile.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dz * dz).sqrt()
    }

    /// Manhattan distance to another tile.
    #[inline]
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.z.abs_diff(other.z))
    }
}

impl Sub for Point {
    type Output = (i32, i32);

    /// Offset from `other` to `self`, clamped to the `i32` range.
    fn sub(self, other: Self) -> (i32, i32) {
        (self.x.saturating_sub(other.x), self.z.saturating_sub(other.z))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

/// Inclusive tile bounds of the playable map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Smallest valid x
    pub min_x: i32,
    /// Largest valid x
    pub max_x: i32,
    /// Smallest valid z
    pub min_z: i32,
    /// Largest valid z
    pub max_z: i32,
}

impl MapBounds {
    /// Creates bounds from inclusive extents.
    #[must_use]
    pub const fn new(min_x: i32, max_x: i32, min_z: i32, max_z: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Square bounds of the given half-size around a center tile.
    #[must_use]
    pub const fn around(center: Point, half_size: i32) -> Self {
        Self::new(
            center.x.saturating_sub(half_size),
            center.x.saturating_add(half_size),
            center.z.saturating_sub(half_size),
            center.z.saturating_add(half_size),
        )
    }

    /// Returns true if the tile lies within the bounds.
    #[inline]
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.z >= self.min_z
            && point.z <= self.max_z
    }
}
