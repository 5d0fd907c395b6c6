//! # Building Placement Engine
//!
//! Sites buildings along a finished road network until a population target
//! is met or the attempt budget runs out.
//!
//! ## Pipeline
//!
//! 1. Rasterize the network into road tiles
//! 2. Locate the town center (first intersection, else segment centroid)
//! 3. Random walks along the roads collect road-fronting candidate spots
//! 4. Spots are weighted by a linear density falloff from the center
//! 5. Loop: sample a spot, validate it, choose a type, verify the footprint
//!
//! ## Termination
//!
//! The loop is bounded by `max(3 * target, 1000)` attempts and aborts after
//! 50 consecutive failures. An unreachable target is not an error; whatever
//! was placed is returned.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use townforge_shared::{Direction, Point, SeededRandom};

use crate::building::catalog::BuildingType;
use crate::building::occupancy::{Building, BuildingOccupancy, RoadOccupancy};
use crate::config::PlacementConfig;
use crate::error::{SettlementError, SettlementResult};
use crate::oracle::{CollisionKind, RoadQuery, SpatialOracle};
use crate::road::RoadNetwork;

/// Why the placement loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStop {
    /// Population reached the target.
    TargetReached,
    /// The attempt budget ran out.
    AttemptsExhausted,
    /// Too many failures in a row.
    FailureCeiling,
    /// An internal fault cut placement short.
    Aborted,
    /// Nothing to do: empty network or zero target.
    Skipped,
}

/// Counters describing one placement run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStats {
    /// Loop iterations used.
    pub attempts: u32,
    /// Attempts that placed nothing.
    pub failures: u32,
    /// Distinct candidate spots found by the walks.
    pub spots_discovered: usize,
    /// Why the loop ended.
    pub stop: PlacementStop,
}

impl PlacementStats {
    const fn skipped() -> Self {
        Self {
            attempts: 0,
            failures: 0,
            spots_discovered: 0,
            stop: PlacementStop::Skipped,
        }
    }
}

/// Result of placing buildings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// Buildings in placement order.
    pub buildings: Vec<Building>,
    /// Sum of every building's population.
    pub total_population: u32,
    /// How the run went.
    pub stats: PlacementStats,
}

impl BuildingPlacement {
    /// A placement with no buildings.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            buildings: Vec::new(),
            total_population: 0,
            stats: PlacementStats::skipped(),
        }
    }
}

/// Validates a raw target population.
///
/// # Errors
///
/// Returns [`SettlementError::InvalidTargetPopulation`] for negative values
/// or values that do not fit in a `u32`.
pub fn target_population_from(raw: i64) -> SettlementResult<u32> {
    u32::try_from(raw).map_err(|_| SettlementError::InvalidTargetPopulation(raw))
}

/// A candidate building site.
#[derive(Clone, Copy, Debug)]
struct Spot {
    position: Point,
    density: f64,
}

/// Why a spot was turned down. Only ever logged.
enum SpotRejection {
    Occupied,
    Terrain(CollisionKind),
    NoRoadAccess,
    BlocksExtension,
    OutOfBounds,
    RoadCrowding(usize),
    Isolated,
}

impl fmt::Display for SpotRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied => write!(f, "already occupied"),
            Self::Terrain(kind) => write!(f, "terrain collision ({kind:?})"),
            Self::NoRoadAccess => write!(f, "no road access"),
            Self::BlocksExtension => write!(f, "blocks a dead end"),
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::RoadCrowding(count) => write!(f, "{count} road neighbours"),
            Self::Isolated => write!(f, "cannot join or seed a block"),
        }
    }
}

/// Working memory of one placement call.
struct BuildingPlacementState {
    occupancy: BuildingOccupancy,
    population: u32,
    target_population: u32,
    attempts: u32,
    failures: u32,
}

impl BuildingPlacementState {
    fn new(target_population: u32) -> Self {
        Self {
            occupancy: BuildingOccupancy::new(),
            population: 0,
            target_population,
            attempts: 0,
            failures: 0,
        }
    }

    fn into_placement(self, spots_discovered: usize, stop: PlacementStop) -> BuildingPlacement {
        let buildings = self.occupancy.into_buildings();
        let total_population = buildings.iter().map(|b| b.population).sum();
        debug_assert_eq!(total_population, self.population);
        BuildingPlacement {
            buildings,
            total_population,
            stats: PlacementStats {
                attempts: self.attempts,
                failures: self.failures,
                spots_discovered,
                stop,
            },
        }
    }
}

/// Places buildings on road networks against a spatial oracle.
#[derive(Clone, Debug)]
pub struct BuildingPlacementEngine<O> {
    oracle: O,
    config: PlacementConfig,
    catalog: Vec<BuildingType>,
}

impl<O: SpatialOracle> BuildingPlacementEngine<O> {
    /// Creates an engine with default parameters and the standard catalog.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, PlacementConfig::default(), BuildingType::standard_catalog())
    }

    /// Creates an engine with explicit parameters and catalog.
    #[must_use]
    pub fn with_config(oracle: O, config: PlacementConfig, catalog: Vec<BuildingType>) -> Self {
        Self {
            oracle,
            config,
            catalog,
        }
    }

    /// Placement parameters in use.
    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Building types this engine chooses from.
    #[must_use]
    pub fn catalog(&self) -> &[BuildingType] {
        &self.catalog
    }

    /// Places buildings along `network` until `target_population` is housed.
    ///
    /// An empty network or a zero target yields an empty placement. Never
    /// fails: internal faults are logged and whatever was placed is returned.
    pub fn place_buildings(
        &self,
        network: &RoadNetwork,
        target_population: u32,
        rng: &mut SeededRandom,
    ) -> BuildingPlacement {
        if network.is_empty() || target_population == 0 {
            tracing::debug!(
                "Skipping placement: {} segments, target {}",
                network.segments.len(),
                target_population
            );
            return BuildingPlacement::empty();
        }

        let roads = RoadOccupancy::from_network(network);
        let center = town_center(network);
        let spots = self.discover_spots(&roads, center, rng);

        let mut state = BuildingPlacementState::new(target_population);
        let stop = match self.fill(&mut state, &roads, center, &spots, rng) {
            Ok(stop) => stop,
            Err(err) => {
                tracing::error!("Building placement aborted, keeping partial result: {}", err);
                PlacementStop::Aborted
            }
        };

        let placement = state.into_placement(spots.len(), stop);
        tracing::info!(
            "Placed {} buildings housing {}/{} in {} attempts ({:?})",
            placement.buildings.len(),
            placement.total_population,
            target_population,
            placement.stats.attempts,
            stop
        );
        placement
    }

    /// Random walks from the center; every road tile visited contributes its
    /// non-road neighbours. Spots are returned in discovery order.
    fn discover_spots(&self, roads: &RoadOccupancy, center: Point, rng: &mut SeededRandom) -> Vec<Spot> {
        let walks = rng.next_int_inclusive(
            to_i32(self.config.walk_count_min),
            to_i32(self.config.walk_count_max),
        );
        let mut spots = Vec::new();
        let mut seen = HashSet::new();

        for _ in 0..walks {
            let steps = rng.next_int_inclusive(
                to_i32(self.config.walk_steps_min),
                to_i32(self.config.walk_steps_max),
            );
            let mut position = center;
            self.collect_frontage(roads, center, position, &mut spots, &mut seen);
            for _ in 0..steps {
                let open: Vec<Direction> = Direction::CARDINALS
                    .into_iter()
                    .filter(|&d| roads.has_road(position.step(d)))
                    .collect();
                let Some(&direction) = rng.select_from_array(&open) else {
                    break;
                };
                position = position.step(direction);
                self.collect_frontage(roads, center, position, &mut spots, &mut seen);
            }
        }

        tracing::debug!("Random walks found {} candidate spots", spots.len());
        spots
    }

    fn collect_frontage(
        &self,
        roads: &RoadOccupancy,
        center: Point,
        position: Point,
        spots: &mut Vec<Spot>,
        seen: &mut HashSet<Point>,
    ) {
        if !roads.has_road(position) {
            return;
        }
        for neighbor in self.oracle.adjacent_positions(position.x, position.z) {
            if !roads.has_road(neighbor) && seen.insert(neighbor) {
                spots.push(Spot {
                    position: neighbor,
                    density: self.density(neighbor, center),
                });
            }
        }
    }

    /// Linear falloff: 1 at the center, 0 at `density_radius` and beyond.
    fn density(&self, spot: Point, center: Point) -> f64 {
        (1.0 - spot.distance(center) / self.config.density_radius).max(0.0)
    }

    /// The bounded placement loop.
    fn fill(
        &self,
        state: &mut BuildingPlacementState,
        roads: &RoadOccupancy,
        center: Point,
        spots: &[Spot],
        rng: &mut SeededRandom,
    ) -> SettlementResult<PlacementStop> {
        let max_attempts = self.config.max_attempts(state.target_population);
        let mut used = vec![false; spots.len()];
        let mut consecutive_failures = 0;

        while state.population < state.target_population {
            if state.attempts >= max_attempts {
                return Ok(PlacementStop::AttemptsExhausted);
            }
            state.attempts += 1;

            let placed = match pick_spot(spots, &mut used, rng) {
                Some(spot) => self.try_place(state, roads, center, spot, rng)?,
                None => {
                    tracing::debug!("No unused spots remain");
                    false
                }
            };

            if placed {
                consecutive_failures = 0;
            } else {
                state.failures += 1;
                consecutive_failures += 1;
                if consecutive_failures >= self.config.max_consecutive_failures {
                    tracing::warn!(
                        "Placement gave up after {} consecutive failures at population {}/{}",
                        consecutive_failures,
                        state.population,
                        state.target_population
                    );
                    return Ok(PlacementStop::FailureCeiling);
                }
            }
        }
        Ok(PlacementStop::TargetReached)
    }

    /// One attempt at one spot.
    fn try_place(
        &self,
        state: &mut BuildingPlacementState,
        roads: &RoadOccupancy,
        center: Point,
        spot: Point,
        rng: &mut SeededRandom,
    ) -> SettlementResult<bool> {
        if let Err(reason) = self.validate_spot(&state.occupancy, roads, spot) {
            tracing::debug!("Spot {} rejected: {}", spot, reason);
            return Ok(false);
        }
        let building_type = self.choose_type(&state.occupancy, center, spot, rng)?;
        if !self.footprint_fits(&state.occupancy, roads, spot, building_type) {
            tracing::debug!("{} does not fit at {}", building_type.name, spot);
            return Ok(false);
        }
        state.population += building_type.population;
        state.occupancy.insert(Building::new(spot, building_type.clone()));
        Ok(true)
    }

    fn validate_spot(
        &self,
        occupancy: &BuildingOccupancy,
        roads: &RoadOccupancy,
        spot: Point,
    ) -> Result<(), SpotRejection> {
        if roads.has_road(spot) || occupancy.is_occupied(spot) {
            return Err(SpotRejection::Occupied);
        }
        self.terrain_allows(spot, roads, occupancy)
            .map_err(SpotRejection::Terrain)?;
        if !self.oracle.is_adjacent_to_road(spot.x, spot.z, roads) {
            return Err(SpotRejection::NoRoadAccess);
        }
        if self.oracle.would_block_road_extension(spot.x, spot.z, roads) {
            return Err(SpotRejection::BlocksExtension);
        }
        let bounds = self.oracle.map_bounds();
        if !bounds.contains(spot) {
            return Err(SpotRejection::OutOfBounds);
        }

        let road_neighbors = roads.road_neighbor_count(spot);
        let near_intersection = roads
            .intersections()
            .iter()
            .any(|&i| i.distance(spot) <= self.config.intersection_relief_radius);
        let limit = if near_intersection {
            4
        } else {
            usize::try_from(self.config.max_road_neighbors).unwrap_or(usize::MAX)
        };
        if road_neighbors == 0 || road_neighbors > limit {
            return Err(SpotRejection::RoadCrowding(road_neighbors));
        }

        let joins_block = occupancy.within(spot, self.config.cluster_radius).next().is_some();
        let seeds_block = spot.cardinal_neighbors().iter().any(|&n| {
            n != spot && bounds.contains(n) && !roads.has_road(n) && !occupancy.is_occupied(n)
        });
        if !joins_block && !seeds_block {
            return Err(SpotRejection::Isolated);
        }
        Ok(())
    }

    /// Oracle building check with slope-only collisions downgraded to allowed.
    fn terrain_allows(
        &self,
        tile: Point,
        roads: &RoadOccupancy,
        occupancy: &BuildingOccupancy,
    ) -> Result<(), CollisionKind> {
        let report = self.oracle.can_place_building(tile.x, tile.z, roads, occupancy);
        if report.is_slope_only() {
            tracing::debug!("Slope at {} allowed for building", tile);
            return Ok(());
        }
        if report.has_collision() {
            return Err(report.kind);
        }
        Ok(())
    }

    /// Size filtering, outskirts damping, footprint weighting and variety.
    #[allow(clippy::cast_precision_loss)]
    fn choose_type(
        &self,
        occupancy: &BuildingOccupancy,
        center: Point,
        spot: Point,
        rng: &mut SeededRandom,
    ) -> SettlementResult<&BuildingType> {
        let distance = spot.distance(center);
        let max_dimension = if distance <= self.config.core_radius { 2 } else { 1 };
        let compression = (distance / self.config.compression_radius).clamp(0.0, 1.0);

        let mut weighted = Vec::with_capacity(self.catalog.len());
        for building_type in &self.catalog {
            if building_type.max_dimension() > max_dimension {
                continue;
            }
            if distance > self.config.outskirts_radius
                && building_type.is_large(self.config.large_population_threshold)
                && !rng.next_boolean(self.config.large_admit_probability)
            {
                continue;
            }
            let weight = 1.0 + (building_type.base_weight() - 1.0) * compression;
            let repeats = occupancy
                .within(spot, self.config.variety_radius)
                .filter(|b| b.building_type.id == building_type.id)
                .count();
            weighted.push((building_type, weight / (1.0 + repeats as f64)));
        }

        match weighted_choice(&weighted, rng) {
            Some(chosen) => Ok(chosen),
            None => BuildingType::smallest(&self.catalog).ok_or(SettlementError::EmptyCatalog),
        }
    }

    fn footprint_fits(
        &self,
        occupancy: &BuildingOccupancy,
        roads: &RoadOccupancy,
        anchor: Point,
        building_type: &BuildingType,
    ) -> bool {
        let Some(tiles) = building_type.checked_footprint(anchor) else {
            return false;
        };
        let bounds = self.oracle.map_bounds();
        let tiles_clear = tiles.into_iter().all(|tile| {
            !occupancy.is_occupied(tile)
                && !roads.has_road(tile)
                && bounds.contains(tile)
                && self.terrain_allows(tile, roads, occupancy).is_ok()
        });
        tiles_clear && self.oracle.is_adjacent_to_road(anchor.x, anchor.z, roads)
    }
}

/// First intersection, else the rounded centroid of segment starts.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn town_center(network: &RoadNetwork) -> Point {
    if let Some(&first) = network.intersections.first() {
        return first;
    }
    let count = network.segments.len().max(1) as f64;
    let (sum_x, sum_z) = network.segments.iter().fold((0.0, 0.0), |(x, z), s| {
        (x + f64::from(s.start.x), z + f64::from(s.start.z))
    });
    Point::new((sum_x / count).round() as i32, (sum_z / count).round() as i32)
}

/// Density-weighted draw over unused spots, uniform if every weight is zero.
/// The chosen spot is marked used.
fn pick_spot(spots: &[Spot], used: &mut [bool], rng: &mut SeededRandom) -> Option<Point> {
    let unused: Vec<usize> = (0..spots.len()).filter(|&i| !used[i]).collect();
    if unused.is_empty() {
        return None;
    }
    let total: f64 = unused.iter().map(|&i| spots[i].density).sum();
    let index = if total > 0.0 {
        let mut remaining = rng.next_float() * total;
        let mut chosen = None;
        for &i in &unused {
            if spots[i].density <= 0.0 {
                continue;
            }
            chosen = Some(i);
            remaining -= spots[i].density;
            if remaining < 0.0 {
                break;
            }
        }
        chosen?
    } else {
        unused[rng.next_index(unused.len())?]
    };
    used[index] = true;
    Some(spots[index].position)
}

/// Cumulative-distribution draw over `(item, weight)` pairs.
fn weighted_choice<'a, T>(items: &[(&'a T, f64)], rng: &mut SeededRandom) -> Option<&'a T> {
    let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut remaining = rng.next_float() * total;
    let mut last_positive = None;
    for &(item, weight) in items {
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(item);
        remaining -= weight;
        if remaining < 0.0 {
            return Some(item);
        }
    }
    last_positive
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
