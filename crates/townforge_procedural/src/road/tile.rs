//! Road tiles, renderable segments and corner metadata.

use serde::{Deserialize, Serialize};
use townforge_shared::{CornerDirection, Direction, Point};

/// Render classification of a road segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    /// Runs along the x axis.
    Horizontal,
    /// Runs along the z axis.
    Vertical,
    /// Single-tile turn piece.
    Corner,
    /// Single-tile crossing piece.
    Intersection,
    /// Runs diagonally.
    Diagonal,
}

/// A placed road cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoadTile {
    /// Tile position.
    pub position: Point,
    /// Directions this tile connects to, in the order they were added.
    pub connections: Vec<Direction>,
    /// Crossroad center.
    pub is_intersection: bool,
    /// Former dead end that turned.
    pub is_corner: bool,
    /// Open end of an arm or branch.
    pub is_dead_end: bool,
}

impl RoadTile {
    /// A plain road tile reached by travelling in `heading`.
    #[must_use]
    pub fn reached_from(position: Point, heading: Direction) -> Self {
        Self {
            position,
            connections: vec![heading.opposite()],
            is_intersection: false,
            is_corner: false,
            is_dead_end: false,
        }
    }

    /// An intersection tile connected in all four cardinal directions.
    #[must_use]
    pub fn crossroad(position: Point) -> Self {
        Self {
            position,
            connections: Direction::CARDINALS.to_vec(),
            is_intersection: true,
            is_corner: false,
            is_dead_end: false,
        }
    }

    /// Adds a connection if it is not already present.
    pub fn connect(&mut self, direction: Direction) {
        if !self.connections.contains(&direction) {
            self.connections.push(direction);
        }
    }

    /// Direction the road was travelling when it reached this tile.
    ///
    /// This is the reverse of the first connection, which always points back
    /// towards where the tile was grown from.
    #[must_use]
    pub fn heading(&self) -> Option<Direction> {
        self.connections.first().map(|d| d.opposite())
    }
}

/// A renderable unit of road.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// First tile covered.
    pub start: Point,
    /// Last tile covered. Equal to `start` for corner and intersection pieces.
    pub end: Point,
    /// Render classification.
    pub road_type: RoadType,
    /// Grid anchor (the tile this segment was created for).
    pub anchor: Point,
    /// Turn piece orientation, set only for corners.
    pub corner_direction: Option<CornerDirection>,
    /// Connections of the anchor tile.
    pub connections: Vec<Direction>,
}

impl RoadSegment {
    /// Segment covering the step from `start` onto the tile at `end`.
    #[must_use]
    pub fn between(start: Point, end: Point, connections: Vec<Direction>) -> Self {
        Self {
            start,
            end,
            road_type: classify_axis(start, end, &connections),
            anchor: end,
            corner_direction: None,
            connections,
        }
    }

    /// Single-tile intersection piece.
    #[must_use]
    pub fn intersection(tile: &RoadTile) -> Self {
        Self {
            start: tile.position,
            end: tile.position,
            road_type: RoadType::Intersection,
            anchor: tile.position,
            corner_direction: None,
            connections: tile.connections.clone(),
        }
    }

    /// Retags this segment as a single-tile corner piece.
    pub fn make_corner(&mut self, direction: CornerDirection, connections: Vec<Direction>) {
        self.start = self.anchor;
        self.end = self.anchor;
        self.road_type = RoadType::Corner;
        self.corner_direction = Some(direction);
        self.connections = connections;
    }

    /// Re-derives the type tag. Corners and intersections keep theirs.
    pub fn reclassify(&mut self) {
        if !matches!(self.road_type, RoadType::Corner | RoadType::Intersection) {
            self.road_type = classify_axis(self.start, self.end, &self.connections);
        }
    }
}

/// Type of a straight piece from its extent, falling back to its connections.
fn classify_axis(start: Point, end: Point, connections: &[Direction]) -> RoadType {
    let (dx, dz) = end - start;
    match (dx != 0, dz != 0) {
        (true, true) => RoadType::Diagonal,
        (true, false) => RoadType::Horizontal,
        (false, true) => RoadType::Vertical,
        (false, false) => {
            if connections.iter().any(|d| !d.is_cardinal()) {
                RoadType::Diagonal
            } else if connections.iter().all(|d| d.is_horizontal()) {
                RoadType::Horizontal
            } else {
                RoadType::Vertical
            }
        }
    }
}

/// Record of a dead end turning into a corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerInfo {
    /// Corner tile.
    pub position: Point,
    /// Orientation of the turn piece.
    pub corner_direction: CornerDirection,
    /// Side the road arrives from.
    pub from: Direction,
    /// First new side the road now leaves through.
    pub to: Direction,
}
