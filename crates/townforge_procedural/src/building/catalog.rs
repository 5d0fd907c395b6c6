//! Building types and their footprints.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use townforge_shared::Point;

use crate::error::{SettlementError, SettlementResult};

/// A kind of building that can be placed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingType {
    /// Unique type identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Residents this building adds.
    pub population: u32,
    /// Footprint extent along x, in tiles.
    pub width: u32,
    /// Footprint extent along z, in tiles.
    pub height: u32,
}

impl BuildingType {
    /// Creates a building type.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, population: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            population,
            width,
            height,
        }
    }

    /// Larger of the two footprint dimensions.
    #[inline]
    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        if self.width > self.height {
            self.width
        } else {
            self.height
        }
    }

    /// Tiles covered.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Returns true for multi-tile or high-population types.
    #[inline]
    #[must_use]
    pub const fn is_large(&self, population_threshold: u32) -> bool {
        self.max_dimension() > 1 || self.population >= population_threshold
    }

    /// Base selection weight: 1x1 is 4, 1x2 and 2x1 are 3, anything larger is 1.
    #[must_use]
    pub const fn base_weight(&self) -> f64 {
        match (self.width, self.height) {
            (1, 1) => 4.0,
            (1, 2) | (2, 1) => 3.0,
            _ => 1.0,
        }
    }

    /// Tiles covered when anchored at `anchor`, row by row.
    ///
    /// Tiles past the edge of the `i32` coordinate range are left out.
    #[must_use]
    pub fn footprint(&self, anchor: Point) -> Vec<Point> {
        self.footprint_tiles(anchor).flatten().collect()
    }

    /// Tiles covered when anchored at `anchor`, or `None` if any of them
    /// falls outside the `i32` coordinate range.
    #[must_use]
    pub fn checked_footprint(&self, anchor: Point) -> Option<Vec<Point>> {
        self.footprint_tiles(anchor).collect()
    }

    fn footprint_tiles(&self, anchor: Point) -> impl Iterator<Item = Option<Point>> {
        let (width, height) = (footprint_extent(self.width), footprint_extent(self.height));
        (0..height).flat_map(move |dz| {
            (0..width).map(move |dx| {
                Some(Point::new(anchor.x.checked_add(dx)?, anchor.z.checked_add(dz)?))
            })
        })
    }

    /// Default village catalog.
    #[must_use]
    pub fn standard_catalog() -> Vec<Self> {
        vec![
            Self::new(1, "Hut", 3, 1, 1),
            Self::new(2, "Cottage", 5, 1, 1),
            Self::new(3, "Townhouse", 8, 1, 2),
            Self::new(4, "Longhouse", 8, 2, 1),
            Self::new(5, "Tenement", 16, 2, 2),
        ]
    }

    /// Smallest type: least area, then least population, then lowest id.
    #[must_use]
    pub fn smallest(catalog: &[Self]) -> Option<&Self> {
        catalog
            .iter()
            .min_by_key(|t| (t.area(), t.population, t.id))
    }

    /// Checks a catalog for use by the placer.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] if the catalog is empty, has
    /// a zero-sized or zero-population type, repeats an id, or lacks a 1x1 type.
    pub fn validate_catalog(catalog: &[Self]) -> SettlementResult<()> {
        if catalog.is_empty() {
            return Err(SettlementError::InvalidConfig(
                "building catalog must not be empty".to_string(),
            ));
        }
        let mut ids = HashSet::new();
        for building in catalog {
            if building.width == 0 || building.height == 0 {
                return Err(SettlementError::InvalidConfig(format!(
                    "building '{}' has an empty footprint",
                    building.name
                )));
            }
            if building.population == 0 {
                return Err(SettlementError::InvalidConfig(format!(
                    "building '{}' houses nobody",
                    building.name
                )));
            }
            if !ids.insert(building.id) {
                return Err(SettlementError::InvalidConfig(format!(
                    "duplicate building id {}",
                    building.id
                )));
            }
        }
        if !catalog.iter().any(|b| b.area() == 1) {
            return Err(SettlementError::InvalidConfig(
                "building catalog needs a 1x1 type to fall back on".to_string(),
            ));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_wrap)]
fn footprint_extent(extent: u32) -> i32 {
    extent.min(i32::MAX as u32) as i32
}
