//! # Road Network Integration Tests
//!
//! Shape, determinism and fallback properties of generated networks.

use std::collections::HashSet;

use townforge_procedural::{
    BranchingStrategy, CollisionKind, GridOracle, RoadConfig, RoadNetwork, RoadNetworkGenerator,
    RoadType,
};
use townforge_shared::{Direction, MapBounds, Point, SeededRandom};

fn open_grid() -> GridOracle {
    GridOracle::open(MapBounds::around(Point::new(0, 0), 200))
}

fn build(seed: u64) -> RoadNetwork {
    RoadNetworkGenerator::new(open_grid()).build_network(0, 0, &mut SeededRandom::new(seed))
}

/// Test: Same seed, same network, segment for segment.
#[test]
fn test_network_determinism() {
    for seed in [0, 1, 42, 9_999, u64::MAX] {
        let a = build(seed);
        let b = build(seed);
        assert_eq!(a, b, "seed {seed} produced two different networks");
    }
}

/// Test: Different seeds grow different towns.
#[test]
fn test_seeds_diverge() {
    let distinct: HashSet<usize> = (0..20).map(|seed| build(seed).segments.len()).collect();
    assert!(distinct.len() > 1, "20 seeds all produced the same segment count");
}

/// Test: One intersection at the center, straight pieces in every half-plane.
#[test]
fn test_crossroad_shape() {
    for seed in 0..50 {
        let network = build(seed);

        let intersections: Vec<_> = network.segments_of(RoadType::Intersection).collect();
        assert_eq!(intersections.len(), 1, "seed {seed}");
        assert_eq!(intersections[0].anchor, Point::new(0, 0));
        assert_eq!(intersections[0].connections.len(), 4);

        let horizontal: Vec<Point> =
            network.segments_of(RoadType::Horizontal).map(|s| s.anchor).collect();
        let vertical: Vec<Point> =
            network.segments_of(RoadType::Vertical).map(|s| s.anchor).collect();
        assert!(horizontal.iter().any(|p| p.x > 0), "seed {seed}: no east arm");
        assert!(horizontal.iter().any(|p| p.x < 0), "seed {seed}: no west arm");
        assert!(vertical.iter().any(|p| p.z > 0), "seed {seed}: no south arm");
        assert!(vertical.iter().any(|p| p.z < 0), "seed {seed}: no north arm");
    }
}

/// Test: Every arm runs straight for 4 to 7 tiles before its first turn.
#[test]
fn test_arm_length_bounds() {
    for seed in 0..100 {
        let network = build(seed);
        let tiles: HashSet<Point> = network.tiles().into_iter().collect();
        for heading in Direction::CARDINALS {
            let reach = (1..)
                .take_while(|&n| tiles.contains(&Point::new(0, 0).offset(heading, n)))
                .last()
                .unwrap_or(0);
            assert!(
                reach >= 4,
                "seed {seed}: {heading} arm only reaches {reach} tiles"
            );
        }
    }
}

/// Test: Corners carry orientation and at least two connections.
#[test]
fn test_corner_consistency() {
    for seed in 0..50 {
        let network = build(seed);
        for corner in network.segments_of(RoadType::Corner) {
            assert!(corner.corner_direction.is_some(), "seed {seed}: corner without direction");
            assert!(corner.connections.len() >= 2, "seed {seed}: corner at {}", corner.anchor);
            assert_eq!(corner.start, corner.end);
        }
        assert_eq!(
            network.segments_of(RoadType::Intersection).count(),
            network.intersections.len()
        );
    }
}

/// Test: Dead ends are listed once and sit on road.
#[test]
fn test_dead_ends_are_unique_road_tiles() {
    for seed in 0..50 {
        let network = build(seed);
        let tiles: HashSet<Point> = network.tiles().into_iter().collect();
        let mut seen = HashSet::new();
        for dead_end in &network.dead_ends {
            assert!(seen.insert(*dead_end), "seed {seed}: {dead_end} listed twice");
            assert!(tiles.contains(dead_end), "seed {seed}: {dead_end} is not road");
        }
    }
}

/// Test: Single-pass branching never recurses, so no branch grows a corner of its own.
#[test]
fn test_single_strategy_turns_only_arm_ends() {
    let config = RoadConfig::default().with_strategy(BranchingStrategy::Single);
    let generator = RoadNetworkGenerator::with_config(open_grid(), config);
    for seed in 0..50 {
        let state = generator
            .generate_state(0, 0, &mut SeededRandom::new(seed))
            .unwrap();
        assert!(state.corners().len() <= 4, "seed {seed}: {} corners", state.corners().len());
        assert!(state
            .segments()
            .iter()
            .all(|s| s.road_type != RoadType::Diagonal));
    }
}

/// Test: Water at the center gives the empty fallback, not a panic.
#[test]
fn test_rejected_center_falls_back_to_empty() {
    let oracle = open_grid().with_water([Point::new(5, 5)]);
    let network =
        RoadNetworkGenerator::new(&oracle).build_network(5, 5, &mut SeededRandom::new(3));
    assert_eq!(network, RoadNetwork::empty());

    let err = RoadNetworkGenerator::new(&oracle)
        .generate_state(5, 5, &mut SeededRandom::new(3))
        .unwrap_err();
    assert!(matches!(
        err,
        townforge_procedural::SettlementError::CenterRejected {
            kind: CollisionKind::Water,
            ..
        }
    ));
}

/// Test: A wall east of the center truncates that arm and nothing crosses it.
#[test]
fn test_obstacles_truncate_growth() {
    let wall = (-200..=200).map(|z| Point::new(3, z));
    let oracle = open_grid().with_blocked(wall);
    for seed in 0..20 {
        let network =
            RoadNetworkGenerator::new(&oracle).build_network(0, 0, &mut SeededRandom::new(seed));
        assert!(network.tiles().iter().all(|p| p.x < 3), "seed {seed} crossed the wall");
    }
}

/// Test: Steep steps are impassable for roads.
#[test]
fn test_cliff_blocks_arm() {
    let oracle = open_grid().with_height_fn(|p| if p.z < -2 { 10 } else { 0 });
    let network =
        RoadNetworkGenerator::new(&oracle).build_network(0, 0, &mut SeededRandom::new(11));
    assert!(network.tiles().iter().all(|p| p.z >= -2));
}

/// Test: Fractional centers are configuration errors.
#[test]
fn test_fractional_center_rejected() {
    let generator = RoadNetworkGenerator::new(open_grid());
    let mut rng = SeededRandom::new(1);
    assert!(generator.build_network_at(0.5, 0.0, &mut rng).is_err());
    assert!(generator.build_network_at(0.0, f64::NAN, &mut rng).is_err());
    assert_eq!(
        generator.build_network_at(2.0, -3.0, &mut SeededRandom::new(1)),
        Ok(generator.build_network(2, -3, &mut SeededRandom::new(1)))
    );
}
