//! Tile occupancy used during placement: rasterized roads and claimed
//! building footprints.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use townforge_shared::{Direction, Point};

use crate::building::catalog::BuildingType;
use crate::oracle::RoadQuery;
use crate::road::{rasterize_segment, RoadNetwork, RoadSegment};

/// Road tiles rebuilt from a finished [`RoadNetwork`].
#[derive(Clone, Debug, Default)]
pub struct RoadOccupancy {
    tiles: HashSet<Point>,
    dead_ends: Vec<Point>,
    headings: HashMap<Point, Direction>,
    intersections: Vec<Point>,
}

impl RoadOccupancy {
    /// Rasterizes every segment of the network.
    #[must_use]
    pub fn from_network(network: &RoadNetwork) -> Self {
        let tiles = network.segments.iter().flat_map(rasterize_segment).collect();
        let headings = network
            .dead_ends
            .iter()
            .filter_map(|&dead_end| {
                network
                    .segments
                    .iter()
                    .find(|s| s.anchor == dead_end)
                    .and_then(segment_heading)
                    .map(|heading| (dead_end, heading))
            })
            .collect();
        Self {
            tiles,
            dead_ends: network.dead_ends.clone(),
            headings,
            intersections: network.intersections.clone(),
        }
    }

    /// Number of road tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if there are no road tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Intersections of the source network.
    #[must_use]
    pub fn intersections(&self) -> &[Point] {
        &self.intersections
    }

    /// Number of axis-aligned neighbours of `point` that are road.
    #[must_use]
    pub fn road_neighbor_count(&self, point: Point) -> usize {
        point
            .cardinal_neighbors()
            .iter()
            .filter(|p| self.tiles.contains(p))
            .count()
    }
}

/// Heading of a dead end: the reverse of its back-connection.
fn segment_heading(segment: &RoadSegment) -> Option<Direction> {
    segment.connections.first().map(|d| d.opposite())
}

impl RoadQuery for RoadOccupancy {
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

/// A placed building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Anchor tile (footprint's minimum corner).
    pub position: Point,
    /// What was built.
    pub building_type: BuildingType,
    /// Residents contributed; always `building_type.population`.
    pub population: u32,
}

impl Building {
    /// A building of `building_type` anchored at `position`.
    #[must_use]
    pub fn new(position: Point, building_type: BuildingType) -> Self {
        let population = building_type.population;
        Self {
            position,
            building_type,
            population,
        }
    }

    /// Tiles this building covers.
    #[must_use]
    pub fn footprint(&self) -> Vec<Point> {
        self.building_type.footprint(self.position)
    }
}

/// Buildings placed so far and the tiles they claim.
#[derive(Clone, Debug, Default)]
pub struct BuildingOccupancy {
    buildings: Vec<Building>,
    claimed: HashMap<Point, usize>,
}

impl BuildingOccupancy {
    /// Creates an empty occupancy map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a building claims the tile.
    #[must_use]
    pub fn is_occupied(&self, point: Point) -> bool {
        self.claimed.contains_key(&point)
    }

    /// Building claiming the tile, if any.
    #[must_use]
    pub fn building_at(&self, point: Point) -> Option<&Building> {
        self.claimed.get(&point).and_then(|&i| self.buildings.get(i))
    }

    /// Buildings in placement order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Number of placed buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Returns true if nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Records a building and claims its whole footprint.
    pub fn insert(&mut self, building: Building) {
        let index = self.buildings.len();
        for tile in building.footprint() {
            self.claimed.insert(tile, index);
        }
        self.buildings.push(building);
    }

    /// Buildings whose anchor lies within `radius` of `point`.
    pub fn within(&self, point: Point, radius: f64) -> impl Iterator<Item = &Building> {
        self.buildings
            .iter()
            .filter(move |b| b.position.distance(point) <= radius)
    }

    /// Consumes the map into its building list.
    #[must_use]
    pub fn into_buildings(self) -> Vec<Building> {
        self.buildings
    }
}
