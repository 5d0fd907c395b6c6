//! # Settlement Error Types
//!
//! Configuration errors are returned to the caller and must be fixed there.
//! Generation-time rejections (a collision, a spot that fails validation) are
//! not errors at all; they only shrink the result. The remaining variants are
//! internal faults that the public entry points log and turn into fallbacks.

use thiserror::Error;

use crate::oracle::CollisionKind;

/// Errors that can occur while configuring or running settlement generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    /// A center coordinate was not a whole tile number.
    #[error("center {axis} coordinate must be an integer, got {value}")]
    NonIntegerCoordinate {
        /// Which axis was malformed ("x" or "z").
        axis: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Target population was negative or too large.
    #[error("invalid target population: {0}")]
    InvalidTargetPopulation(i64),

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(String),

    /// The oracle refused the crossroad center.
    #[error("oracle rejected settlement center ({x}, {z}): {kind:?}")]
    CenterRejected {
        /// Center x.
        x: i32,
        /// Center z.
        z: i32,
        /// Reported collision.
        kind: CollisionKind,
    },

    /// The generator referenced a tile it never placed.
    #[error("no road tile at ({x}, {z})")]
    UnknownTile {
        /// Tile x.
        x: i32,
        /// Tile z.
        z: i32,
    },

    /// No building type is available to place.
    #[error("building catalog is empty")]
    EmptyCatalog,
}

/// Result type for settlement operations.
pub type SettlementResult<T> = Result<T, SettlementError>;
