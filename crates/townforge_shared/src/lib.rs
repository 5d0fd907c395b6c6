//! # TOWNFORGE Shared
//!
//! Value types used by every stage of settlement generation.
//!
//! ## CRITICAL RULE
//!
//! Everything here is deterministic. [`SeededRandom`] is the only source of
//! randomness any generator may consume, and it must be passed explicitly.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod geometry;
pub mod random;
pub mod seed;

pub use geometry::{CornerDirection, Direction, MapBounds, Point};
pub use random::SeededRandom;
pub use seed::SettlementSeed;
