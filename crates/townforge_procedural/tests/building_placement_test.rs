//! # Building Placement Integration Tests
//!
//! Placement on generated networks: occupancy disjointness, population
//! accounting, attempt bounds and graceful degradation.

use std::collections::HashSet;

use townforge_procedural::{
    BuildingOccupancy, BuildingPlacementEngine, CollisionReport, GridOracle, PlacementConfig,
    PlacementStop, RoadNetwork, RoadNetworkGenerator, RoadQuery, SpatialOracle,
};
use townforge_shared::{MapBounds, Point, SeededRandom};

/// Collision always succeeds; only roads and bounds matter.
struct AlwaysClear;

impl SpatialOracle for AlwaysClear {
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
        MapBounds::around(Point::new(0, 0), 500)
    }
}

fn network(seed: u64) -> RoadNetwork {
    RoadNetworkGenerator::new(AlwaysClear).build_network(0, 0, &mut SeededRandom::new(seed))
}

/// Test: Same network and seed, same buildings.
#[test]
fn test_placement_determinism() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    for seed in 0..10 {
        let roads = network(seed);
        let a = engine.place_buildings(&roads, 60, &mut SeededRandom::new(seed + 100));
        let b = engine.place_buildings(&roads, 60, &mut SeededRandom::new(seed + 100));
        assert_eq!(a, b, "seed {seed}");
    }
}

/// Test: No footprint overlaps a road or another footprint.
#[test]
fn test_occupancy_disjointness() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    for seed in 0..25 {
        let roads = network(seed);
        let road_tiles: HashSet<Point> = roads.tiles().into_iter().collect();
        let placement = engine.place_buildings(&roads, 150, &mut SeededRandom::new(seed));

        let mut claimed = HashSet::new();
        for building in &placement.buildings {
            for tile in building.footprint() {
                assert!(!road_tiles.contains(&tile), "seed {seed}: {tile} is road");
                assert!(claimed.insert(tile), "seed {seed}: {tile} claimed twice");
            }
        }
    }
}

/// Test: Total population is the exact sum of placed yields.
#[test]
fn test_population_accounting() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    for seed in 0..25 {
        let placement = engine.place_buildings(&network(seed), 90, &mut SeededRandom::new(seed));
        let sum: u32 = placement
            .buildings
            .iter()
            .map(|b| b.building_type.population)
            .sum();
        assert_eq!(placement.total_population, sum, "seed {seed}");
    }
}

/// Test: A reachable target is met when collision always succeeds.
#[test]
fn test_reachable_target_is_met() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    for seed in 0..25 {
        let placement = engine.place_buildings(&network(seed), 12, &mut SeededRandom::new(seed));
        assert_eq!(placement.stats.stop, PlacementStop::TargetReached, "seed {seed}");
        assert!(placement.total_population >= 12, "seed {seed}");
    }
}

/// Test: The loop never exceeds its attempt budget.
#[test]
fn test_attempt_bounds() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    let config = engine.config().clone();
    for (seed, target) in [(1u64, 10u32), (2, 400), (3, 5_000)] {
        let placement = engine.place_buildings(&network(seed), target, &mut SeededRandom::new(seed));
        let stats = placement.stats;
        assert!(stats.attempts <= config.max_attempts(target), "seed {seed}");
        assert!(stats.failures <= stats.attempts);
        assert_eq!(
            stats.attempts - stats.failures,
            u32::try_from(placement.buildings.len()).unwrap()
        );
        if stats.stop == PlacementStop::FailureCeiling {
            assert!(stats.failures >= config.max_consecutive_failures);
        }
    }
}

/// Test: An unreachable target stops at a ceiling instead of looping.
#[test]
fn test_unreachable_target_terminates() {
    let config = PlacementConfig {
        max_consecutive_failures: 20,
        ..PlacementConfig::default()
    };
    let engine = BuildingPlacementEngine::with_config(
        AlwaysClear,
        config,
        townforge_procedural::BuildingType::standard_catalog(),
    );
    let placement = engine.place_buildings(&network(5), 1_000_000, &mut SeededRandom::new(5));
    assert!(placement.total_population < 1_000_000);
    assert!(matches!(
        placement.stats.stop,
        PlacementStop::FailureCeiling | PlacementStop::AttemptsExhausted
    ));
}

/// Test: Empty network and zero target both yield nothing.
#[test]
fn test_graceful_degradation() {
    let engine = BuildingPlacementEngine::new(AlwaysClear);
    let mut rng = SeededRandom::new(1);

    let none = engine.place_buildings(&RoadNetwork::empty(), 50, &mut rng);
    assert!(none.buildings.is_empty());
    assert_eq!(none.total_population, 0);

    let zero = engine.place_buildings(&network(1), 0, &mut rng);
    assert!(zero.buildings.is_empty());
    assert_eq!(zero.total_population, 0);
    assert_eq!(zero.stats.stop, PlacementStop::Skipped);
}

/// Test: Every building is road-adjacent and inside the map.
#[test]
fn test_buildings_front_roads() {
    let oracle = GridOracle::open(MapBounds::around(Point::new(0, 0), 40));
    let roads = RoadNetworkGenerator::new(&oracle).build_network(0, 0, &mut SeededRandom::new(8));
    let road_tiles: HashSet<Point> = roads.tiles().into_iter().collect();
    let placement =
        BuildingPlacementEngine::new(&oracle).place_buildings(&roads, 80, &mut SeededRandom::new(8));

    assert!(!placement.buildings.is_empty());
    for building in &placement.buildings {
        let anchor = building.position;
        assert!(
            anchor.cardinal_neighbors().iter().any(|n| road_tiles.contains(n)),
            "{anchor} has no road access"
        );
        assert!(building
            .footprint()
            .iter()
            .all(|&t| oracle.map_bounds().contains(t)));
    }
}

/// Test: Water tiles never receive buildings.
#[test]
fn test_water_is_never_built_on() {
    let water: Vec<Point> = (-40..=40).map(|x| Point::new(x, 1)).collect();
    let oracle = GridOracle::open(MapBounds::around(Point::new(0, 0), 40)).with_water(water.clone());
    let roads = RoadNetworkGenerator::new(&oracle).build_network(0, 0, &mut SeededRandom::new(21));
    let placement =
        BuildingPlacementEngine::new(&oracle).place_buildings(&roads, 60, &mut SeededRandom::new(21));

    let water: HashSet<Point> = water.into_iter().collect();
    for building in &placement.buildings {
        assert!(building.footprint().iter().all(|t| !water.contains(t)));
    }
}
