//! # Generation Configuration
//!
//! Every tuning constant of the road grower and the building placer, with
//! defaults matching the classic behaviour. Loaded from TOML; any field may
//! be omitted.
//!
//! ```toml
//! [roads]
//! strategy = "recursive"
//! max_branch_depth = 3
//!
//! [placement]
//! max_consecutive_failures = 50
//!
//! [[buildings]]
//! id = 1
//! name = "Cottage"
//! population = 4
//! width = 1
//! height = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::error::{SettlementError, SettlementResult};

/// How deep branching recursion goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchingStrategy {
    /// One branch pass over the arm ends, no recursion.
    Single,
    /// Branch terminals branch again, up to `max_branch_depth`.
    #[default]
    Recursive,
}

/// Road network growth parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Branching depth strategy.
    pub strategy: BranchingStrategy,
    /// Tiles laid per crossroad arm.
    pub arm_initial_length: u32,
    /// Minimum arm extension length, counting the dead end it grows from.
    pub arm_extension_min: u32,
    /// Maximum arm extension length, counting the dead end it grows from.
    pub arm_extension_max: u32,
    /// Chance of branching to each side of a dead end.
    pub branch_probability: f64,
    /// Minimum extra tiles after a branch's first tile.
    pub branch_extra_min: u32,
    /// Maximum extra tiles after a branch's first tile.
    pub branch_extra_max: u32,
    /// Chance of a diagonal continuation.
    pub diagonal_probability: f64,
    /// Minimum diagonal tiles.
    pub diagonal_length_min: u32,
    /// Maximum diagonal tiles.
    pub diagonal_length_max: u32,
    /// Deepest branch level for the recursive strategy.
    pub max_branch_depth: u32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            strategy: BranchingStrategy::Recursive,
            arm_initial_length: 2,
            arm_extension_min: 3,
            arm_extension_max: 6,
            branch_probability: 0.7,
            branch_extra_min: 1,
            branch_extra_max: 2,
            diagonal_probability: 0.3,
            diagonal_length_min: 1,
            diagonal_length_max: 2,
            max_branch_depth: 3,
        }
    }
}

impl RoadConfig {
    /// Effective maximum depth: zero for the single-pass strategy.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        match self.strategy {
            BranchingStrategy::Single => 0,
            BranchingStrategy::Recursive => self.max_branch_depth,
        }
    }

    /// Same parameters with a different strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: BranchingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Checks ranges and probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> SettlementResult<()> {
        check_range("roads.arm_extension", self.arm_extension_min, self.arm_extension_max)?;
        check_range("roads.branch_extra", self.branch_extra_min, self.branch_extra_max)?;
        check_range(
            "roads.diagonal_length",
            self.diagonal_length_min,
            self.diagonal_length_max,
        )?;
        check_probability("roads.branch_probability", self.branch_probability)?;
        check_probability("roads.diagonal_probability", self.diagonal_probability)?;
        if self.arm_extension_min == 0 {
            return Err(SettlementError::InvalidConfig(
                "roads.arm_extension_min must count the dead end itself (>= 1)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Building placement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Fewest random walks.
    pub walk_count_min: u32,
    /// Most random walks.
    pub walk_count_max: u32,
    /// Fewest steps per walk.
    pub walk_steps_min: u32,
    /// Most steps per walk.
    pub walk_steps_max: u32,
    /// Distance at which spot density falls to zero.
    pub density_radius: f64,
    /// Attempt budget per resident of the target.
    pub attempts_per_resident: u32,
    /// Attempt budget floor.
    pub min_attempts: u32,
    /// Consecutive failures that abort placement.
    pub max_consecutive_failures: u32,
    /// Within this distance of the center, footprints up to 2 tiles are allowed.
    pub core_radius: f64,
    /// Beyond this distance, large types are only admitted by chance.
    pub outskirts_radius: f64,
    /// Admission chance for large types in the outskirts.
    pub large_admit_probability: f64,
    /// Population at which a type counts as large regardless of footprint.
    pub large_population_threshold: u32,
    /// Spots this close to an intersection may touch road on all four sides.
    pub intersection_relief_radius: f64,
    /// Spots this close to a placed building join its block.
    pub cluster_radius: f64,
    /// Neighbourhood searched for repeated types.
    pub variety_radius: f64,
    /// Within this distance of the center, footprint weights flatten out.
    pub compression_radius: f64,
    /// Road-touching sides allowed for a spot away from intersections.
    pub max_road_neighbors: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            walk_count_min: 5,
            walk_count_max: 15,
            walk_steps_min: 3,
            walk_steps_max: 7,
            density_radius: 20.0,
            attempts_per_resident: 3,
            min_attempts: 1000,
            max_consecutive_failures: 50,
            core_radius: 8.0,
            outskirts_radius: 10.0,
            large_admit_probability: 0.3,
            large_population_threshold: 10,
            intersection_relief_radius: 5.0,
            cluster_radius: 3.0,
            variety_radius: 4.0,
            compression_radius: 5.0,
            max_road_neighbors: 3,
        }
    }
}

impl PlacementConfig {
    /// Attempt ceiling for a target population.
    #[must_use]
    pub fn max_attempts(&self, target_population: u32) -> u32 {
        self.attempts_per_resident
            .saturating_mul(target_population)
            .max(self.min_attempts)
    }

    /// Checks ranges, radii and probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> SettlementResult<()> {
        check_range("placement.walk_count", self.walk_count_min, self.walk_count_max)?;
        check_range("placement.walk_steps", self.walk_steps_min, self.walk_steps_max)?;
        check_probability("placement.large_admit_probability", self.large_admit_probability)?;
        for (name, radius) in [
            ("placement.density_radius", self.density_radius),
            ("placement.core_radius", self.core_radius),
            ("placement.outskirts_radius", self.outskirts_radius),
            ("placement.compression_radius", self.compression_radius),
            ("placement.intersection_relief_radius", self.intersection_relief_radius),
            ("placement.cluster_radius", self.cluster_radius),
            ("placement.variety_radius", self.variety_radius),
        ] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SettlementError::InvalidConfig(format!(
                    "{name} must be positive, got {radius}"
                )));
            }
        }
        if self.max_consecutive_failures == 0 {
            return Err(SettlementError::InvalidConfig(
                "placement.max_consecutive_failures must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete settlement configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Road growth parameters.
    pub roads: RoadConfig,
    /// Building placement parameters.
    pub placement: PlacementConfig,
    /// Building catalog.
    pub buildings: Vec<BuildingType>,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            roads: RoadConfig::default(),
            placement: PlacementConfig::default(),
            buildings: BuildingType::standard_catalog(),
        }
    }
}

impl SettlementConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::ConfigParse`] for malformed TOML and
    /// [`SettlementError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> SettlementResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SettlementError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::ConfigIo`] if the file cannot be read, plus
    /// anything [`Self::from_toml_str`] returns.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SettlementResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SettlementError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> SettlementResult<()> {
        self.roads.validate()?;
        self.placement.validate()?;
        BuildingType::validate_catalog(&self.buildings)
    }
}

fn check_range(name: &str, min: u32, max: u32) -> SettlementResult<()> {
    if min > max {
        return Err(SettlementError::InvalidConfig(format!(
            "{name}: min {min} exceeds max {max}"
        )));
    }
    Ok(())
}

fn check_probability(name: &str, p: f64) -> SettlementResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SettlementError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {p}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SettlementConfig::default().validate().unwrap();
    }

    #[test]
    fn test_single_strategy_caps_depth() {
        let config = RoadConfig::default().with_strategy(BranchingStrategy::Single);
        assert_eq!(config.max_depth(), 0);
        assert_eq!(RoadConfig::default().max_depth(), 3);
    }

    #[test]
    fn test_attempt_budget() {
        let config = PlacementConfig::default();
        assert_eq!(config.max_attempts(10), 1000);
        assert_eq!(config.max_attempts(500), 1500);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SettlementConfig::from_toml_str(
            r#"
            [roads]
            strategy = "single"
            branch_probability = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.roads.strategy, BranchingStrategy::Single);
        assert!((config.roads.branch_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.roads.arm_extension_max, 6);
        assert_eq!(config.placement, PlacementConfig::default());
        assert!(!config.buildings.is_empty());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = SettlementConfig::from_toml_str(
            r"
            [placement]
            walk_steps_min = 9
            walk_steps_max = 3
            ",
        )
        .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidConfig(msg) if msg.contains("walk_steps")));
    }

    #[test]
    fn test_bad_probability_rejected() {
        let err = SettlementConfig::from_toml_str("[roads]\ndiagonal_probability = 1.5\n")
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidConfig(_)));
    }

    #[test]
    fn test_every_radius_must_be_positive() {
        for field in [
            "density_radius",
            "core_radius",
            "outskirts_radius",
            "compression_radius",
            "intersection_relief_radius",
            "cluster_radius",
            "variety_radius",
        ] {
            for value in ["0.0", "-2.5", "nan"] {
                let err = SettlementConfig::from_toml_str(&format!("[placement]\n{field} = {value}\n"))
                    .unwrap_err();
                assert!(
                    matches!(&err, SettlementError::InvalidConfig(msg) if msg.contains(field)),
                    "{field} = {value} gave {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = SettlementConfig::from_toml_str("[roads\nstrategy = ").unwrap_err();
        assert!(matches!(err, SettlementError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SettlementConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, SettlementError::ConfigIo(_)));
    }

    #[test]
    fn test_bundled_config_parses() {
        let config =
            SettlementConfig::from_toml_str(include_str!("../../../config/settlement.toml"))
                .unwrap();
        assert_eq!(config.roads.max_branch_depth, 3);
        assert_eq!(config.buildings.len(), 5);
    }
}
