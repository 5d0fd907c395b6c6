//! # Spatial Occupancy Oracle
//!
//! The generators never look at terrain directly. Every question about
//! legality, passability, adjacency and map bounds goes through a
//! [`SpatialOracle`], which the caller supplies.
//!
//! Road state is handed to the oracle as a [`RoadQuery`] so the same oracle
//! serves both the generator (which owns a full tile map) and the placer
//! (which only has a rasterized occupancy set).

use townforge_shared::{Direction, MapBounds, Point};

use crate::building::BuildingOccupancy;

/// What kind of obstacle an oracle reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// No collision.
    None,
    /// Open water.
    Water,
    /// Impassable terrain (rock, cliff, reserved land).
    Terrain,
    /// Terrain is usable but sloped. Building placement treats this as allowed.
    Slope,
    /// An existing road tile.
    Road,
    /// An existing building footprint.
    Building,
    /// Outside the playable map.
    OutOfBounds,
}

/// Result of a placement-legality query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionReport {
    /// Collision classification.
    pub kind: CollisionKind,
    /// Optional human-readable detail.
    pub message: Option<String>,
}

impl CollisionReport {
    /// A report with no collision.
    #[inline]
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            kind: CollisionKind::None,
            message: None,
        }
    }

    /// A collision of the given kind.
    #[inline]
    #[must_use]
    pub const fn blocked(kind: CollisionKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns true if anything was hit.
    #[inline]
    #[must_use]
    pub fn has_collision(&self) -> bool {
        self.kind != CollisionKind::None
    }

    /// Returns true if the only problem is a slope.
    #[inline]
    #[must_use]
    pub fn is_slope_only(&self) -> bool {
        self.kind == CollisionKind::Slope
    }
}

/// Read-only view of placed road tiles.
pub trait RoadQuery {
    /// Returns true if a road occupies the tile.
    fn has_road(&self, point: Point) -> bool;

    /// Current dead ends, in discovery order.
    fn dead_ends(&self) -> &[Point];

    /// Direction the road would continue in from a dead end, if known.
    fn dead_end_heading(&self, point: Point) -> Option<Direction>;
}

/// Answers spatial legality questions for the generators.
///
/// Only the terrain-specific queries are required; adjacency and extension
/// blocking have default implementations in terms of the [`RoadQuery`].
pub trait SpatialOracle {
    /// Can a road tile be laid at `(x, z)`?
    fn can_place_road(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> CollisionReport;

    /// Can a building cover the tile `(x, z)`?
    fn can_place_building(
        &self,
        x: i32,
        z: i32,
        roads: &dyn RoadQuery,
        buildings: &BuildingOccupancy,
    ) -> CollisionReport;

    /// Can a road step from `(x1, z1)` to `(x2, z2)`?
    fn is_passable(&self, x1: i32, z1: i32, x2: i32, z2: i32) -> bool;

    /// Inclusive bounds of the playable map.
    fn map_bounds(&self) -> MapBounds;

    /// The four axis-aligned neighbours of `(x, z)`.
    fn adjacent_positions(&self, x: i32, z: i32) -> [Point; 4] {
        Point::new(x, z).cardinal_neighbors()
    }

    /// Returns true if any axis-aligned neighbour is a road.
    fn is_adjacent_to_road(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> bool {
        self.adjacent_positions(x, z)
            .iter()
            .any(|&p| roads.has_road(p))
    }

    /// Returns true if `(x, z)` sits on the two tiles a dead end would grow into.
    fn would_block_road_extension(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> bool {
        let target = Point::new(x, z);
        roads.dead_ends().iter().any(|&dead_end| {
            roads
                .dead_end_heading(dead_end)
                .is_some_and(|heading| (1..=2).any(|n| dead_end.offset(heading, n) == target))
        })
    }
}

impl<O: SpatialOracle + ?Sized> SpatialOracle for &O {
    fn can_place_road(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> CollisionReport {
        (**self).can_place_road(x, z, roads)
    }

    fn can_place_building(
        &self,
        x: i32,
        z: i32,
        roads: &dyn RoadQuery,
        buildings: &BuildingOccupancy,
    ) -> CollisionReport {
        (**self).can_place_building(x, z, roads, buildings)
    }

    fn is_passable(&self, x1: i32, z1: i32, x2: i32, z2: i32) -> bool {
        (**self).is_passable(x1, z1, x2, z2)
    }

    fn map_bounds(&self) -> MapBounds {
        (**self).map_bounds()
    }

    fn adjacent_positions(&self, x: i32, z: i32) -> [Point; 4] {
        (**self).adjacent_positions(x, z)
    }

    fn is_adjacent_to_road(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> bool {
        (**self).is_adjacent_to_road(x, z, roads)
    }

    fn would_block_road_extension(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> bool {
        (**self).would_block_road_extension(x, z, roads)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    struct Roads {
        tiles: HashSet<Point>,
        dead_ends: Vec<Point>,
        headings: HashMap<Point, Direction>,
    }

    impl RoadQuery for Roads {
        fn has_road(&self, point: Point) -> bool {
            self.tiles.contains(&point)
        }

        fn dead_ends(&self) -> &[Point] {
            &self.dead_ends
        }

        fn dead_end_heading(&self, point: Point) -> Option<Direction> {
            self.headings.get(&point).copied()
        }
    }

    struct Flat;

    impl SpatialOracle for Flat {
        fn can_place_road(&self, _: i32, _: i32, _: &dyn RoadQuery) -> CollisionReport {
            CollisionReport::clear()
        }

        fn can_place_building(
            &self,
            _: i32,
            _: i32,
            _: &dyn RoadQuery,
            _: &BuildingOccupancy,
        ) -> CollisionReport {
            CollisionReport::clear()
        }

        fn is_passable(&self, _: i32, _: i32, _: i32, _: i32) -> bool {
            true
        }

        fn map_bounds(&self) -> MapBounds {
            MapBounds::around(Point::new(0, 0), 50)
        }
    }

    fn east_arm() -> Roads {
        let tiles: HashSet<Point> = (0..=3).map(|x| Point::new(x, 0)).collect();
        Roads {
            tiles,
            dead_ends: vec![Point::new(3, 0)],
            headings: HashMap::from([(Point::new(3, 0), Direction::East)]),
        }
    }

    #[test]
    fn test_adjacency_default() {
        let roads = east_arm();
        assert!(Flat.is_adjacent_to_road(2, 1, &roads));
        assert!(Flat.is_adjacent_to_road(4, 0, &roads));
        assert!(!Flat.is_adjacent_to_road(2, 2, &roads));
        // Diagonal contact does not count.
        assert!(!Flat.is_adjacent_to_road(4, 1, &roads));
    }

    #[test]
    fn test_extension_blocking_covers_two_tiles_ahead() {
        let roads = east_arm();
        assert!(Flat.would_block_road_extension(4, 0, &roads));
        assert!(Flat.would_block_road_extension(5, 0, &roads));
        assert!(!Flat.would_block_road_extension(6, 0, &roads));
        assert!(!Flat.would_block_road_extension(3, 1, &roads));
    }

    #[test]
    fn test_slope_is_a_sub_classification() {
        let slope = CollisionReport::blocked(CollisionKind::Slope).with_message("grade 0.8");
        assert!(slope.has_collision());
        assert!(slope.is_slope_only());
        assert!(!CollisionReport::blocked(CollisionKind::Water).is_slope_only());
        assert!(!CollisionReport::clear().has_collision());
    }

    #[test]
    fn test_reference_forwarding() {
        let oracle = Flat;
        let by_ref: &dyn SpatialOracle = &oracle;
        assert_eq!(by_ref.map_bounds(), Flat.map_bounds());
        assert_eq!(
            (&oracle).adjacent_positions(0, 0),
            Point::new(0, 0).cardinal_neighbors()
        );
    }
}
