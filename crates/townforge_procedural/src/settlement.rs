//! # Settlement Generator
//!
//! One call from a seed to a finished settlement: roads first, then
//! buildings along them. Each stage draws from its own stream derived from
//! the settlement seed.

use serde::{Deserialize, Serialize};
use townforge_shared::{Point, SeededRandom, SettlementSeed};

use crate::building::{target_population_from, BuildingPlacement, BuildingPlacementEngine};
use crate::config::SettlementConfig;
use crate::error::SettlementResult;
use crate::oracle::SpatialOracle;
use crate::road::{tile_coordinate, RoadNetwork, RoadNetworkGenerator};

/// A generated settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Seed it was generated from.
    pub seed: SettlementSeed,
    /// Crossroad center.
    pub center: Point,
    /// Road network.
    pub network: RoadNetwork,
    /// Buildings placed along the network.
    pub placement: BuildingPlacement,
}

impl Settlement {
    /// Residents housed.
    #[inline]
    #[must_use]
    pub fn population(&self) -> u32 {
        self.placement.total_population
    }

    /// Returns true if the center was rejected and nothing was built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.network.is_empty()
    }
}

/// Runs road growth and building placement against one oracle.
#[derive(Clone, Debug)]
pub struct SettlementGenerator<O> {
    oracle: O,
    config: SettlementConfig,
}

impl<O: SpatialOracle> SettlementGenerator<O> {
    /// Creates a generator. The configuration is used as given; call
    /// [`SettlementConfig::validate`] first if it came from user input.
    #[must_use]
    pub fn new(oracle: O, config: SettlementConfig) -> Self {
        Self { oracle, config }
    }

    /// Creates a generator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever [`SettlementConfig::validate`] reports.
    pub fn validated(oracle: O, config: SettlementConfig) -> SettlementResult<Self> {
        config.validate()?;
        Ok(Self::new(oracle, config))
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// The oracle every stage consults.
    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Generates a settlement. Equal inputs always give equal settlements.
    pub fn generate(&self, seed: SettlementSeed, center: Point, target_population: u32) -> Settlement {
        let root = SeededRandom::from_seed(seed);
        let roads = RoadNetworkGenerator::with_config(&self.oracle, self.config.roads.clone());
        let mut road_rng = root.fork(SettlementSeed::ROADS);
        let network = roads.build_network(center.x, center.z, &mut road_rng);

        let buildings = BuildingPlacementEngine::with_config(
            &self.oracle,
            self.config.placement.clone(),
            self.config.buildings.clone(),
        );
        let mut building_rng = root.fork(SettlementSeed::BUILDINGS);
        let placement = buildings.place_buildings(&network, target_population, &mut building_rng);

        tracing::info!(
            "Settlement {:?} at {}: {} road segments, {} buildings, population {}",
            seed,
            center,
            network.segments.len(),
            placement.buildings.len(),
            placement.total_population
        );

        Settlement {
            seed,
            center,
            network,
            placement,
        }
    }

    /// Generates a settlement from unchecked caller input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SettlementError::NonIntegerCoordinate`] for a
    /// fractional or non-finite center and
    /// [`crate::SettlementError::InvalidTargetPopulation`] for a negative or
    /// oversized target.
    pub fn generate_checked(
        &self,
        seed: SettlementSeed,
        center_x: f64,
        center_z: f64,
        target_population: i64,
    ) -> SettlementResult<Settlement> {
        let center = Point::new(tile_coordinate("x", center_x)?, tile_coordinate("z", center_z)?);
        let target = target_population_from(target_population)?;
        Ok(self.generate(seed, center, target))
    }
}
