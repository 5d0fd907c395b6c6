//! # Buildings
//!
//! Population-driven placement of buildings along a finished road network.

pub mod catalog;
pub mod occupancy;
pub mod placement;

pub use catalog::BuildingType;
pub use occupancy::{Building, BuildingOccupancy, RoadOccupancy};
pub use placement::{
    target_population_from, BuildingPlacement, BuildingPlacementEngine, PlacementStats,
    PlacementStop,
};
