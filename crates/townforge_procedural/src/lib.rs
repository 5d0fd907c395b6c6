//! # TOWNFORGE Procedural Settlements
//!
//! Deterministic generation of small settlements: a road network grown from
//! a crossroad, then buildings sited along it until a population target is
//! housed.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed, oracle and config always give the same town
//! 2. **Oracle-driven**: Terrain is never read directly; a [`SpatialOracle`]
//!    answers every legality question
//! 3. **Best effort**: Rejections shrink the result, they never fail the call
//!
//! ## Core Components
//!
//! - [`RoadNetworkGenerator`]: crossroad, arm extension, branching, classification
//! - [`BuildingPlacementEngine`]: random-walk spot discovery and weighted placement
//! - [`SettlementGenerator`]: both stages from one seed
//! - [`GridOracle`]: a tile-grid oracle with heights, water and obstacles
//!
//! ## Example
//!
//! ```rust,ignore
//! use townforge_procedural::{GridOracle, SettlementConfig, SettlementGenerator};
//! use townforge_shared::{MapBounds, Point, SettlementSeed};
//!
//! let oracle = GridOracle::open(MapBounds::around(Point::new(0, 0), 64));
//! let generator = SettlementGenerator::new(oracle, SettlementConfig::default());
//!
//! let town = generator.generate(SettlementSeed::new(12345), Point::new(0, 0), 120);
//! assert!(town.population() > 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod building;
pub mod config;
pub mod error;
pub mod grid_oracle;
pub mod oracle;
pub mod road;
pub mod settlement;

pub use building::{
    target_population_from, Building, BuildingOccupancy, BuildingPlacement,
    BuildingPlacementEngine, BuildingType, PlacementStats, PlacementStop, RoadOccupancy,
};
pub use config::{BranchingStrategy, PlacementConfig, RoadConfig, SettlementConfig};
pub use error::{SettlementError, SettlementResult};
pub use grid_oracle::GridOracle;
pub use oracle::{CollisionKind, CollisionReport, RoadQuery, SpatialOracle};
pub use road::{
    rasterize_segment, tile_coordinate, CornerInfo, RoadGenerationState, RoadNetwork,
    RoadNetworkGenerator, RoadSegment, RoadTile, RoadType,
};
pub use settlement::{Settlement, SettlementGenerator};
