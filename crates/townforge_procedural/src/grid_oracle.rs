//! # Grid Oracle
//!
//! A ready-made [`SpatialOracle`] over a bounded tile grid with per-tile
//! heights, water and blocked tiles.
//!
//! Heights are whole units. A road may step between two tiles whose heights
//! differ by at most `max_step`. A building tile reports [`CollisionKind::Slope`]
//! when its steepest neighbour difference exceeds the slope limit, and
//! [`CollisionKind::Terrain`] once that difference passes the cliff limit.

use std::collections::{HashMap, HashSet};

use townforge_shared::{MapBounds, Point};

use crate::building::BuildingOccupancy;
use crate::oracle::{CollisionKind, CollisionReport, RoadQuery, SpatialOracle};

/// Default height difference a road can climb in one step.
pub const DEFAULT_MAX_STEP: i32 = 1;

/// Default neighbour height difference above which a building site is sloped.
pub const DEFAULT_SLOPE_LIMIT: i32 = 1;

/// Default neighbour height difference above which a building site is a cliff.
pub const DEFAULT_CLIFF_LIMIT: i32 = 3;

/// Tile grid oracle.
#[derive(Clone, Debug)]
pub struct GridOracle {
    bounds: MapBounds,
    heights: HashMap<Point, i32>,
    water: HashSet<Point>,
    blocked: HashSet<Point>,
    max_step: i32,
    slope_limit: i32,
    cliff_limit: i32,
}

impl GridOracle {
    /// Flat, dry, unobstructed map.
    #[must_use]
    pub fn open(bounds: MapBounds) -> Self {
        Self {
            bounds,
            heights: HashMap::new(),
            water: HashSet::new(),
            blocked: HashSet::new(),
            max_step: DEFAULT_MAX_STEP,
            slope_limit: DEFAULT_SLOPE_LIMIT,
            cliff_limit: DEFAULT_CLIFF_LIMIT,
        }
    }

    /// Sets the height of one tile. Unset tiles are at height 0.
    #[must_use]
    pub fn with_height(mut self, point: Point, height: i32) -> Self {
        self.heights.insert(point, height);
        self
    }

    /// Sets the height of every tile produced by `height_at` inside the bounds.
    #[must_use]
    pub fn with_height_fn(mut self, height_at: impl Fn(Point) -> i32) -> Self {
        for z in self.bounds.min_z..=self.bounds.max_z {
            for x in self.bounds.min_x..=self.bounds.max_x {
                let point = Point::new(x, z);
                let height = height_at(point);
                if height != 0 {
                    self.heights.insert(point, height);
                }
            }
        }
        self
    }

    /// Marks tiles as open water.
    #[must_use]
    pub fn with_water(mut self, tiles: impl IntoIterator<Item = Point>) -> Self {
        self.water.extend(tiles);
        self
    }

    /// Marks tiles as impassable terrain.
    #[must_use]
    pub fn with_blocked(mut self, tiles: impl IntoIterator<Item = Point>) -> Self {
        self.blocked.extend(tiles);
        self
    }

    /// Sets the largest height difference a road can step across.
    #[must_use]
    pub const fn with_max_step(mut self, max_step: i32) -> Self {
        self.max_step = max_step;
        self
    }

    /// Sets the slope and cliff limits for building sites.
    #[must_use]
    pub const fn with_slope_limits(mut self, slope: i32, cliff: i32) -> Self {
        self.slope_limit = slope;
        self.cliff_limit = cliff;
        self
    }

    /// Height of a tile.
    #[inline]
    #[must_use]
    pub fn height(&self, point: Point) -> i32 {
        self.heights.get(&point).copied().unwrap_or(0)
    }

    /// Steepest height difference to an in-bounds cardinal neighbour.
    #[must_use]
    pub fn steepness(&self, point: Point) -> i32 {
        let here = self.height(point);
        point
            .cardinal_neighbors()
            .into_iter()
            .filter(|&n| self.bounds.contains(n))
            .map(|n| self.height(n).saturating_sub(here).saturating_abs())
            .max()
            .unwrap_or(0)
    }

    /// Terrain-only verdict shared by roads and buildings.
    fn ground(&self, point: Point) -> CollisionReport {
        if !self.bounds.contains(point) {
            CollisionReport::blocked(CollisionKind::OutOfBounds)
        } else if self.water.contains(&point) {
            CollisionReport::blocked(CollisionKind::Water)
        } else if self.blocked.contains(&point) {
            CollisionReport::blocked(CollisionKind::Terrain)
        } else {
            CollisionReport::clear()
        }
    }
}

impl SpatialOracle for GridOracle {
    fn can_place_road(&self, x: i32, z: i32, roads: &dyn RoadQuery) -> CollisionReport {
        let point = Point::new(x, z);
        let ground = self.ground(point);
        if ground.has_collision() {
            return ground;
        }
        if roads.has_road(point) {
            return CollisionReport::blocked(CollisionKind::Road);
        }
        CollisionReport::clear()
    }

    fn can_place_building(
        &self,
        x: i32,
        z: i32,
        roads: &dyn RoadQuery,
        buildings: &BuildingOccupancy,
    ) -> CollisionReport {
        let point = Point::new(x, z);
        let ground = self.ground(point);
        if ground.has_collision() {
            return ground;
        }
        if roads.has_road(point) {
            return CollisionReport::blocked(CollisionKind::Road);
        }
        if buildings.is_occupied(point) {
            return CollisionReport::blocked(CollisionKind::Building);
        }
        let steepness = self.steepness(point);
        if steepness > self.cliff_limit {
            CollisionReport::blocked(CollisionKind::Terrain)
                .with_message(format!("cliff of {steepness}"))
        } else if steepness > self.slope_limit {
            CollisionReport::blocked(CollisionKind::Slope)
                .with_message(format!("grade of {steepness}"))
        } else {
            CollisionReport::clear()
        }
    }

    fn is_passable(&self, x1: i32, z1: i32, x2: i32, z2: i32) -> bool {
        let (from, to) = (Point::new(x1, z1), Point::new(x2, z2));
        if self.ground(from).has_collision() || self.ground(to).has_collision() {
            return false;
        }
        self.height(to).saturating_sub(self.height(from)).saturating_abs() <= self.max_step
    }

    fn map_bounds(&self) -> MapBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use townforge_shared::Direction;

    use super::*;

    struct NoRoads;

    impl RoadQuery for NoRoads {
        fn has_road(&self, _: Point) -> bool {
            false
        }

        fn dead_ends(&self) -> &[Point] {
            &[]
        }

        fn dead_end_heading(&self, _: Point) -> Option<Direction> {
            None
        }
    }

    fn bounds() -> MapBounds {
        MapBounds::around(Point::new(0, 0), 10)
    }

    #[test]
    fn test_open_grid_allows_everything_inside() {
        let grid = GridOracle::open(bounds());
        assert!(!grid.can_place_road(3, -4, &NoRoads).has_collision());
        assert!(!grid
            .can_place_building(3, -4, &NoRoads, &BuildingOccupancy::new())
            .has_collision());
        assert!(grid.is_passable(0, 0, 0, 1));
    }

    #[test]
    fn test_bounds_water_and_terrain() {
        let grid = GridOracle::open(bounds())
            .with_water([Point::new(1, 1)])
            .with_blocked([Point::new(2, 2)]);
        assert_eq!(grid.can_place_road(11, 0, &NoRoads).kind, CollisionKind::OutOfBounds);
        assert_eq!(grid.can_place_road(1, 1, &NoRoads).kind, CollisionKind::Water);
        assert_eq!(grid.can_place_road(2, 2, &NoRoads).kind, CollisionKind::Terrain);
        assert!(!grid.is_passable(1, 0, 1, 1));
    }

    #[test]
    fn test_step_height_limits_passability() {
        let grid = GridOracle::open(bounds())
            .with_height(Point::new(1, 0), 1)
            .with_height(Point::new(2, 0), 3);
        assert!(grid.is_passable(0, 0, 1, 0));
        assert!(!grid.is_passable(1, 0, 2, 0));
        assert!(grid.with_max_step(2).is_passable(1, 0, 2, 0));
    }

    #[test]
    fn test_building_slope_classification() {
        let grid = GridOracle::open(bounds())
            .with_height(Point::new(5, 0), 2)
            .with_height(Point::new(-5, 0), 6);
        let occupancy = BuildingOccupancy::new();
        let sloped = grid.can_place_building(4, 0, &NoRoads, &occupancy);
        assert!(sloped.is_slope_only());
        let cliff = grid.can_place_building(-4, 0, &NoRoads, &occupancy);
        assert_eq!(cliff.kind, CollisionKind::Terrain);
    }

    #[test]
    fn test_height_fn_fills_bounds() {
        let grid = GridOracle::open(bounds()).with_height_fn(|p| p.x / 4);
        assert_eq!(grid.height(Point::new(8, 3)), 2);
        assert_eq!(grid.height(Point::new(-1, 0)), 0);
        assert_eq!(grid.steepness(Point::new(3, 0)), 1);
    }
}
