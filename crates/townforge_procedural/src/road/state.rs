//! Working memory of one road generation call, and its public snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use townforge_shared::{Direction, Point};

use crate::error::{SettlementError, SettlementResult};
use crate::oracle::RoadQuery;
use crate::road::tile::{CornerInfo, RoadSegment, RoadTile, RoadType};

/// Everything the generator knows while growing a network.
///
/// Owned by exactly one generation call. Tiles are keyed structurally by
/// position; segments are kept in creation order.
#[derive(Clone, Debug, Default)]
pub struct RoadGenerationState {
    tiles: HashMap<Point, RoadTile>,
    /// Index into `segments` of the segment anchored at each tile.
    segment_of: HashMap<Point, usize>,
    segments: Vec<RoadSegment>,
    intersections: Vec<Point>,
    dead_ends: Vec<Point>,
    corners: Vec<CornerInfo>,
}

impl RoadGenerationState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tile at `point`, if any.
    #[must_use]
    pub fn tile(&self, point: Point) -> Option<&RoadTile> {
        self.tiles.get(&point)
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Segments in creation order.
    #[must_use]
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// Intersection tiles.
    #[must_use]
    pub fn intersections(&self) -> &[Point] {
        &self.intersections
    }

    /// Corner transitions, in the order they happened.
    #[must_use]
    pub fn corners(&self) -> &[CornerInfo] {
        &self.corners
    }

    /// Places the crossroad center.
    pub(crate) fn place_intersection(&mut self, center: Point) {
        let tile = RoadTile::crossroad(center);
        self.push_segment(center, RoadSegment::intersection(&tile));
        self.tiles.insert(center, tile);
        self.intersections.push(center);
    }

    /// Lays a tile at `from + heading`, connecting it back to `from`.
    ///
    /// The caller has already checked legality.
    pub(crate) fn place_step(&mut self, from: Point, heading: Direction) -> SettlementResult<Point> {
        let to = from.step(heading);
        self.connect(from, heading)?;
        let tile = RoadTile::reached_from(to, heading);
        self.push_segment(to, RoadSegment::between(from, to, tile.connections.clone()));
        self.tiles.insert(to, tile);
        Ok(to)
    }

    /// Adds `direction` to the tile's connections and its segment.
    fn connect(&mut self, point: Point, direction: Direction) -> SettlementResult<()> {
        let tile = self
            .tiles
            .get_mut(&point)
            .ok_or(SettlementError::UnknownTile { x: point.x, z: point.z })?;
        tile.connect(direction);
        if let Some(segment) = self.segment_of.get(&point).and_then(|&i| self.segments.get_mut(i)) {
            segment.connections.clone_from(&tile.connections);
        }
        Ok(())
    }

    fn push_segment(&mut self, anchor: Point, segment: RoadSegment) {
        self.segment_of.insert(anchor, self.segments.len());
        self.segments.push(segment);
    }

    /// Flags a tile as a live dead end and records it.
    pub(crate) fn mark_dead_end(&mut self, point: Point) -> SettlementResult<()> {
        let tile = self.tile_mut(point)?;
        tile.is_dead_end = true;
        if !self.dead_ends.contains(&point) {
            self.dead_ends.push(point);
        }
        Ok(())
    }

    /// Flags a tile as a dead end without listing it. Used for branch
    /// terminals that are still waiting in the growth worklist.
    pub(crate) fn flag_pending_dead_end(&mut self, point: Point) -> SettlementResult<()> {
        self.tile_mut(point)?.is_dead_end = true;
        Ok(())
    }

    /// Clears the dead-end flag and removes the tile from the list.
    pub(crate) fn clear_dead_end(&mut self, point: Point) -> SettlementResult<()> {
        self.tile_mut(point)?.is_dead_end = false;
        self.dead_ends.retain(|&p| p != point);
        Ok(())
    }

    /// Removes and returns every listed dead end, leaving their flags set.
    pub(crate) fn take_dead_ends(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.dead_ends)
    }

    /// Turns a dead end into a corner and retags its segment.
    pub(crate) fn convert_to_corner(
        &mut self,
        point: Point,
        new_directions: &[Direction],
        info: CornerInfo,
    ) -> SettlementResult<()> {
        let tile = self.tile_mut(point)?;
        tile.is_dead_end = false;
        tile.is_corner = true;
        for &direction in new_directions {
            tile.connect(direction);
        }
        let connections = tile.connections.clone();
        if let Some(segment) = self.segment_of.get(&point).and_then(|&i| self.segments.get_mut(i)) {
            segment.make_corner(info.corner_direction, connections);
        }
        self.dead_ends.retain(|&p| p != point);
        self.corners.push(info);
        Ok(())
    }

    /// Re-derives segment type tags. Idempotent.
    pub(crate) fn classify_segments(&mut self) {
        for segment in &mut self.segments {
            segment.reclassify();
        }
    }

    fn tile_mut(&mut self, point: Point) -> SettlementResult<&mut RoadTile> {
        self.tiles
            .get_mut(&point)
            .ok_or(SettlementError::UnknownTile { x: point.x, z: point.z })
    }

    /// Consumes the state into its public snapshot.
    #[must_use]
    pub fn into_network(self) -> RoadNetwork {
        RoadNetwork {
            segments: self.segments,
            intersections: self.intersections,
            dead_ends: self.dead_ends,
        }
    }
}

impl RoadQuery for RoadGenerationState {
    fn has_road(&self, point: Point) -> bool {
        self.tiles.contains_key(&point)
    }

    fn dead_ends(&self) -> &[Point] {
        &self.dead_ends
    }

    fn dead_end_heading(&self, point: Point) -> Option<Direction> {
        self.tiles.get(&point).and_then(RoadTile::heading)
    }
}

/// Finished road network handed to the building placer.
///
/// No tile map is exposed; consumers rasterize `segments` themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadNetwork {
    /// Segments in creation order.
    pub segments: Vec<RoadSegment>,
    /// Intersection tiles.
    pub intersections: Vec<Point>,
    /// Permanent dead ends.
    pub dead_ends: Vec<Point>,
}

impl RoadNetwork {
    /// The network with nothing in it. Returned when generation fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no road was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments of the given type.
    pub fn segments_of(&self, road_type: RoadType) -> impl Iterator<Item = &RoadSegment> {
        self.segments.iter().filter(move |s| s.road_type == road_type)
    }

    /// Every tile covered by the network, in segment order, without repeats.
    #[must_use]
    pub fn tiles(&self) -> Vec<Point> {
        let mut seen = std::collections::HashSet::new();
        self.segments
            .iter()
            .flat_map(rasterize_segment)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// Integer tiles a segment covers.
///
/// Corner, intersection and zero-length pieces cover their start tile only;
/// longer pieces are interpolated along their longer axis.
#[must_use]
pub fn rasterize_segment(segment: &RoadSegment) -> Vec<Point> {
    if segment.start == segment.end
        || matches!(segment.road_type, RoadType::Corner | RoadType::Intersection)
    {
        return vec![segment.start];
    }
    let (dx, dz) = segment.end - segment.start;
    let steps = dx.saturating_abs().max(dz.saturating_abs());
    (0..=steps)
        .map(|i| {
            let t = f64::from(i) / f64::from(steps);
            Point::new(
                lerp_round(segment.start.x, dx, t),
                lerp_round(segment.start.z, dz, t),
            )
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn lerp_round(origin: i32, delta: i32, t: f64) -> i32 {
    (f64::from(origin) + f64::from(delta) * t).round() as i32
}
