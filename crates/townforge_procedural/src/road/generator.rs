//! # Road Network Generator
//!
//! Grows a road network outward from a center tile in four stages:
//!
//! 1. **Crossroad**: an intersection with a short arm in each cardinal direction
//! 2. **Arm extension**: each arm end is pushed further out by a random length
//! 3. **Branching**: dead ends turn left/right (and sometimes diagonally),
//!    becoming corners; new branch ends branch again up to a depth limit
//! 4. **Classification**: segment type tags are re-derived
//!
//! Branching runs from an explicit stack of `(tile, depth)` entries, processed
//! in the same depth-first order a recursive walk would use.
//!
//! Every tile is checked against the oracle and for passability before it is
//! laid. A rejected tile truncates that arm or branch; it is never an error.

use townforge_shared::{CornerDirection, Direction, Point, SeededRandom};

use crate::config::RoadConfig;
use crate::error::{SettlementError, SettlementResult};
use crate::oracle::{RoadQuery, SpatialOracle};
use crate::road::state::{RoadGenerationState, RoadNetwork};
use crate::road::tile::CornerInfo;

/// Builds road networks against a spatial oracle.
#[derive(Clone, Debug)]
pub struct RoadNetworkGenerator<O> {
    oracle: O,
    config: RoadConfig,
}

impl<O: SpatialOracle> RoadNetworkGenerator<O> {
    /// Creates a generator with default parameters.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, RoadConfig::default())
    }

    /// Creates a generator with explicit parameters.
    #[must_use]
    pub fn with_config(oracle: O, config: RoadConfig) -> Self {
        Self { oracle, config }
    }

    /// Growth parameters in use.
    #[must_use]
    pub fn config(&self) -> &RoadConfig {
        &self.config
    }

    /// Grows a network centered on `(center_x, center_z)`.
    ///
    /// Never fails: if the center itself is rejected or generation faults,
    /// the empty network is returned and the fault is logged.
    pub fn build_network(&self, center_x: i32, center_z: i32, rng: &mut SeededRandom) -> RoadNetwork {
        match self.generate_state(center_x, center_z, rng) {
            Ok(state) => {
                tracing::info!(
                    "Road network at ({}, {}): {} segments, {} corners, {} dead ends",
                    center_x,
                    center_z,
                    state.segments().len(),
                    state.corners().len(),
                    state.dead_ends().len()
                );
                state.into_network()
            }
            Err(err) => {
                tracing::error!("Road generation failed, returning empty network: {}", err);
                RoadNetwork::empty()
            }
        }
    }

    /// Like [`Self::build_network`], for world-space coordinates that must
    /// name a whole tile.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::NonIntegerCoordinate`] if either coordinate
    /// is fractional, non-finite or outside the tile range.
    pub fn build_network_at(
        &self,
        center_x: f64,
        center_z: f64,
        rng: &mut SeededRandom,
    ) -> SettlementResult<RoadNetwork> {
        let x = tile_coordinate("x", center_x)?;
        let z = tile_coordinate("z", center_z)?;
        Ok(self.build_network(x, z, rng))
    }

    /// Runs all four stages and returns the full working state.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::CenterRejected`] if the oracle refuses the
    /// center tile. Faults inside a single arm or branch are logged and
    /// absorbed instead.
    pub fn generate_state(
        &self,
        center_x: i32,
        center_z: i32,
        rng: &mut SeededRandom,
    ) -> SettlementResult<RoadGenerationState> {
        let center = Point::new(center_x, center_z);
        let mut state = RoadGenerationState::new();
        self.lay_crossroad(&mut state, center)?;
        self.extend_arms(&mut state, center, rng);
        self.grow_branches(&mut state, rng);
        state.classify_segments();
        Ok(state)
    }

    /// Stage 1: center intersection plus a short arm each way.
    fn lay_crossroad(&self, state: &mut RoadGenerationState, center: Point) -> SettlementResult<()> {
        let report = self.oracle.can_place_road(center.x, center.z, state);
        if report.has_collision() {
            return Err(SettlementError::CenterRejected {
                x: center.x,
                z: center.z,
                kind: report.kind,
            });
        }
        state.place_intersection(center);

        for heading in Direction::CARDINALS {
            let arm = self
                .extend_straight(state, center, heading, self.config.arm_initial_length)
                .and_then(|end| match end {
                    Some(end) => state.mark_dead_end(end),
                    None => Ok(()),
                });
            if let Err(err) = arm {
                tracing::warn!("Crossroad arm {} abandoned: {}", heading, err);
            }
        }
        Ok(())
    }

    /// Stage 2: push every arm end further out.
    fn extend_arms(&self, state: &mut RoadGenerationState, center: Point, rng: &mut SeededRandom) {
        let arm_ends = state.dead_ends().to_vec();
        for dead_end in arm_ends {
            if let Err(err) = self.extend_arm(state, center, dead_end, rng) {
                tracing::warn!("Arm extension from {} abandoned: {}", dead_end, err);
            }
        }
    }

    fn extend_arm(
        &self,
        state: &mut RoadGenerationState,
        center: Point,
        dead_end: Point,
        rng: &mut SeededRandom,
    ) -> SettlementResult<()> {
        let (dx, dz) = dead_end - center;
        let Some(heading) = Direction::dominant(dx, dz) else {
            return Ok(());
        };
        // The drawn length counts the dead end itself.
        let length = rng.next_int_inclusive(
            to_i32(self.config.arm_extension_min),
            to_i32(self.config.arm_extension_max),
        );
        let added = u32::try_from(length - 1).unwrap_or(0);
        if let Some(end) = self.extend_straight(state, dead_end, heading, added)? {
            state.clear_dead_end(dead_end)?;
            state.mark_dead_end(end)?;
        }
        Ok(())
    }

    /// Stage 3: branch dead ends, depth first.
    fn grow_branches(&self, state: &mut RoadGenerationState, rng: &mut SeededRandom) {
        let max_depth = self.config.max_depth();
        let mut pending: Vec<(Point, u32)> =
            state.take_dead_ends().into_iter().rev().map(|p| (p, 0)).collect();

        while let Some((tile, depth)) = pending.pop() {
            if depth > max_depth {
                self.retire_dead_end(state, tile);
                continue;
            }
            match self.branch(state, tile, depth, rng) {
                Ok(terminals) if terminals.is_empty() => self.retire_dead_end(state, tile),
                Ok(terminals) => {
                    for &terminal in &terminals {
                        if let Err(err) = state.flag_pending_dead_end(terminal) {
                            tracing::warn!("Branch terminal {} lost: {}", terminal, err);
                        }
                    }
                    pending.extend(terminals.into_iter().rev().map(|t| (t, depth + 1)));
                }
                Err(err) => {
                    tracing::warn!("Branching at {} abandoned: {}", tile, err);
                    self.retire_dead_end(state, tile);
                }
            }
        }
    }

    /// Lists a tile as a permanent dead end.
    fn retire_dead_end(&self, state: &mut RoadGenerationState, tile: Point) {
        if let Err(err) = state.mark_dead_end(tile) {
            tracing::warn!("Dead end {} could not be recorded: {}", tile, err);
        }
    }

    /// One branch step at a dead end. Returns the new branch terminals; an
    /// empty result means nothing could be built and the tile stays a dead end.
    fn branch(
        &self,
        state: &mut RoadGenerationState,
        tile: Point,
        depth: u32,
        rng: &mut SeededRandom,
    ) -> SettlementResult<Vec<Point>> {
        let heading = state
            .tile(tile)
            .ok_or(SettlementError::UnknownTile { x: tile.x, z: tile.z })?
            .heading();
        let Some(heading) = heading else {
            return Ok(Vec::new());
        };

        let mut turns = Vec::with_capacity(3);
        let mut terminals = Vec::with_capacity(3);

        let (left, right) = heading.perpendicular_pair();
        for side in [left, right] {
            if !rng.next_boolean(self.config.branch_probability) {
                continue;
            }
            if let Some(end) = self.grow_side_branch(state, tile, side, rng)? {
                turns.push(side);
                terminals.push(end);
            }
        }

        if depth < self.config.max_depth() && rng.next_boolean(self.config.diagonal_probability) {
            let continuations = heading.diagonal_continuations();
            if let Some(&diagonal) = rng.select_from_array(&continuations) {
                let length = rng.next_int_inclusive(
                    to_i32(self.config.diagonal_length_min),
                    to_i32(self.config.diagonal_length_max),
                );
                let length = u32::try_from(length).unwrap_or(0);
                if let Some(end) = self.extend_straight(state, tile, diagonal, length)? {
                    turns.push(diagonal);
                    terminals.push(end);
                }
            }
        }

        let Some(&first_turn) = turns.first() else {
            tracing::debug!("Dead end {} could not branch", tile);
            return Ok(terminals);
        };
        let from = heading.opposite();
        let info = CornerInfo {
            position: tile,
            corner_direction: CornerDirection::from_turn(from, first_turn),
            from,
            to: first_turn,
        };
        state.convert_to_corner(tile, &turns, info)?;
        Ok(terminals)
    }

    /// A perpendicular branch: one tile, then 1-2 more if that one fits.
    fn grow_side_branch(
        &self,
        state: &mut RoadGenerationState,
        tile: Point,
        side: Direction,
        rng: &mut SeededRandom,
    ) -> SettlementResult<Option<Point>> {
        let Some(first) = self.extend_straight(state, tile, side, 1)? else {
            return Ok(None);
        };
        let extra = rng.next_int_inclusive(
            to_i32(self.config.branch_extra_min),
            to_i32(self.config.branch_extra_max),
        );
        let extra = u32::try_from(extra).unwrap_or(0);
        let end = self.extend_straight(state, first, side, extra)?.unwrap_or(first);
        Ok(Some(end))
    }

    /// Lays up to `count` tiles from `from` in `heading`, stopping at the
    /// first rejected tile. Returns the last tile laid, if any.
    fn extend_straight(
        &self,
        state: &mut RoadGenerationState,
        from: Point,
        heading: Direction,
        count: u32,
    ) -> SettlementResult<Option<Point>> {
        let mut current = from;
        let mut last = None;
        for _ in 0..count {
            if !self.can_step(state, current, heading) {
                break;
            }
            current = state.place_step(current, heading)?;
            last = Some(current);
        }
        Ok(last)
    }

    /// Collision and passability check for one step.
    fn can_step(&self, state: &RoadGenerationState, from: Point, heading: Direction) -> bool {
        let Some(to) = from.checked_step(heading) else {
            tracing::debug!("Road from {} would leave the coordinate range", from);
            return false;
        };
        if state.has_road(to) {
            tracing::debug!("Road at {} blocked by existing road", to);
            return false;
        }
        let report = self.oracle.can_place_road(to.x, to.z, state);
        if report.has_collision() {
            tracing::debug!(
                "Road at {} blocked: {:?} {}",
                to,
                report.kind,
                report.message.as_deref().unwrap_or("")
            );
            return false;
        }
        self.oracle.is_passable(from.x, from.z, to.x, to.z)
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Converts a world coordinate into a tile coordinate, rejecting fractions.
///
/// # Errors
///
/// Returns [`SettlementError::NonIntegerCoordinate`] for fractional,
/// non-finite or out-of-range values.
#[allow(clippy::cast_possible_truncation)]
pub fn tile_coordinate(axis: &'static str, value: f64) -> SettlementResult<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    if !value.is_finite() || value.fract() != 0.0 || !in_range {
        return Err(SettlementError::NonIntegerCoordinate { axis, value });
    }
    Ok(value as i32)
}
