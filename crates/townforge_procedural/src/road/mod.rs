//! # Road Network
//!
//! Tile-level road growth from a center point.
//!
//! - [`RoadNetworkGenerator`]: the four-stage grower
//! - [`RoadGenerationState`]: its owned working memory
//! - [`RoadNetwork`]: the immutable result handed to building placement

pub mod generator;
pub mod state;
pub mod tile;

pub use generator::{tile_coordinate, RoadNetworkGenerator};
pub use state::{rasterize_segment, RoadGenerationState, RoadNetwork};
pub use tile::{CornerInfo, RoadSegment, RoadTile, RoadType};
