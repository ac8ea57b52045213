#![forbid(unsafe_code)]

//! Authoritative zone collection and the placement policy.
//!
//! Every mutation goes through the same pipeline: snap to the grid pitch,
//! clamp into the world bounds (and above the minimum size), then check for
//! collisions against every other zone. A proposal that fails the collision
//! check is dropped and the zone keeps its prior geometry. The caller gets an
//! outcome value describing what happened, never an error.
//!
//! # Invariants
//!
//! After any sequence of operations, for every live zone:
//! - position and size are multiples of the pitch
//! - each side is at least the configured minimum
//! - the rectangle lies within `[0, width] x [0, height]`
//! - no other zone overlaps it (edge contact is allowed)
//!
//! [`World::check_invariants`] verifies all of the above and is what snapshot
//! loading runs before accepting foreign state.

use std::collections::BTreeSet;
use std::fmt;

use placegrid_core::{
    ConfigError, Corner, EditorConfig, GridPitch, MAX_LABEL_CHARS, WorldDelta, WorldPoint,
    WorldPos, WorldSize, ZoneId, ZoneIdAllocator, ZoneRect,
};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "placegrid.layout";

/// Label shown for a zone whose label is blank.
pub const LABEL_PLACEHOLDER: &str = "Enter title...";

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Display color of a zone. Assigned cyclically in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneColor {
    Sky,
    Mint,
    Peach,
    Lavender,
    Sand,
    Rose,
}

impl ZoneColor {
    pub const PALETTE: [Self; 6] = [
        Self::Sky,
        Self::Mint,
        Self::Peach,
        Self::Lavender,
        Self::Sand,
        Self::Rose,
    ];

    /// Palette entry for the `index`-th zone created in a session.
    #[must_use]
    pub const fn for_index(index: u64) -> Self {
        Self::PALETTE[(index % Self::PALETTE.len() as u64) as usize]
    }

    /// CSS hex color.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Sky => "#93c5fd",
            Self::Mint => "#86efac",
            Self::Peach => "#fdba74",
            Self::Lavender => "#c4b5fd",
            Self::Sand => "#fde68a",
            Self::Rose => "#fda4af",
        }
    }
}

/// One reservable rectangular area on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub rect: ZoneRect,
    pub color: ZoneColor,
    pub label: String,
}

impl Zone {
    /// Label to render, falling back to [`LABEL_PLACEHOLDER`] when blank.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            LABEL_PLACEHOLDER
        } else {
            &self.label
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a geometry or label change left the world untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoreReason {
    UnknownZone,
    Collision { with: ZoneId },
    /// The proposal resolved to the zone's current geometry.
    Unchanged,
    /// The proposal could not be brought onto the grid inside the bounds.
    InvalidGeometry,
    LabelTooLong { chars: usize },
}

/// Result of a move or resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Placement {
    Applied { rect: ZoneRect },
    Ignored { reason: IgnoreReason },
}

impl Placement {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }
}

/// Why an add or copy produced no zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    UnknownZone,
    Collision { with: ZoneId },
    IdsExhausted,
}

/// Result of an add or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Creation {
    Added { zone: ZoneId },
    Rejected { reason: RejectReason },
}

impl Creation {
    /// The new zone id, if one was created.
    #[must_use]
    pub const fn zone(&self) -> Option<ZoneId> {
        match *self {
            Self::Added { zone } => Some(zone),
            Self::Rejected { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Bounded canvas holding the live zones and the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    size: WorldSize,
    pitch: GridPitch,
    min_side: i32,
    default_side: i32,
    place_name: String,
    zones: Vec<Zone>,
    selected: Option<ZoneId>,
    ids: ZoneIdAllocator,
    created: u64,
}

impl World {
    /// Empty world sized and gridded per `config`.
    pub fn new(config: &EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            size: config.world,
            pitch: config.pitch(),
            min_side: config.min_zone_size(),
            default_side: config.default_zone_size(),
            place_name: config.place_name.clone(),
            zones: Vec::new(),
            selected: None,
            ids: ZoneIdAllocator::default(),
            created: 0,
        })
    }

    #[must_use]
    pub const fn size(&self) -> WorldSize {
        self.size
    }

    #[must_use]
    pub const fn pitch(&self) -> GridPitch {
        self.pitch
    }

    /// Minimum zone side in world units.
    #[must_use]
    pub const fn min_zone_side(&self) -> i32 {
        self.min_side
    }

    /// Side of newly added zones in world units.
    #[must_use]
    pub const fn default_zone_side(&self) -> i32 {
        self.default_side
    }

    #[must_use]
    pub fn place_name(&self) -> &str {
        &self.place_name
    }

    /// Live zones in insertion order (later zones draw on top).
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    #[must_use]
    pub const fn selected(&self) -> Option<ZoneId> {
        self.selected
    }

    #[must_use]
    pub fn selected_zone(&self) -> Option<&Zone> {
        self.selected.and_then(|id| self.zone(id))
    }

    /// Id the next created zone will receive.
    #[must_use]
    pub const fn next_id(&self) -> ZoneId {
        self.ids.peek()
    }

    /// Topmost zone containing the world position, if any.
    #[must_use]
    pub fn zone_at(&self, at: WorldPos) -> Option<ZoneId> {
        self.zones
            .iter()
            .rev()
            .find(|zone| zone.rect.contains(at.x, at.y))
            .map(|zone| zone.id)
    }

    /// First zone other than `except` whose bounds overlap `rect`.
    #[must_use]
    pub fn first_collision(&self, rect: &ZoneRect, except: Option<ZoneId>) -> Option<ZoneId> {
        self.zones
            .iter()
            .filter(|zone| Some(zone.id) != except)
            .find(|zone| zone.rect.overlaps(rect))
            .map(|zone| zone.id)
    }

    /// Select a live zone. Returns `false` for unknown ids.
    pub fn select(&mut self, id: ZoneId) -> bool {
        if self.zone(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Add a default-sized zone anchored at the grid cell containing `at`.
    ///
    /// The anchor is clamped so the zone fits in the world. On success the
    /// new zone is selected.
    pub fn add_zone(&mut self, at: WorldPos) -> Creation {
        let side = self.default_side;
        let x = clamp_span(self.pitch.cells(self.pitch.cell_index(at.x)), side, self.size.width);
        let y = clamp_span(self.pitch.cells(self.pitch.cell_index(at.y)), side, self.size.height);
        self.insert(ZoneRect::new(x, y, side, side))
    }

    /// Add a default-sized zone with its top-left corner at grid cell
    /// `(column, row)`.
    pub fn add_zone_at_cell(&mut self, column: i32, row: i32) -> Creation {
        let at = WorldPoint::new(self.pitch.cells(column), self.pitch.cells(row));
        self.add_zone(WorldPos::from(at))
    }

    /// Duplicate a zone two grid steps down and to the right.
    ///
    /// The copy keeps the source size and label, takes the next palette
    /// color, is clamped into bounds and is selected on success. A colliding
    /// copy is discarded.
    pub fn copy_zone(&mut self, id: ZoneId) -> Creation {
        let Some(source) = self.zone(id) else {
            tracing::trace!(target: LOG_TARGET, zone = %id, "copy of unknown zone ignored");
            return Creation::Rejected {
                reason: RejectReason::UnknownZone,
            };
        };
        let offset = self.pitch.cells(2);
        let rect = source.rect;
        let label = source.label.clone();
        let copy = ZoneRect::new(
            clamp_span(rect.x.saturating_add(offset), rect.width, self.size.width),
            clamp_span(rect.y.saturating_add(offset), rect.height, self.size.height),
            rect.width,
            rect.height,
        );
        match self.insert(copy) {
            Creation::Added { zone } => {
                if let Some(created) = self.zone_mut(zone) {
                    created.label = label;
                }
                Creation::Added { zone }
            }
            rejected => rejected,
        }
    }

    fn insert(&mut self, rect: ZoneRect) -> Creation {
        if let Some(with) = self.first_collision(&rect, None) {
            tracing::trace!(target: LOG_TARGET, %rect, %with, "zone creation collides");
            return Creation::Rejected {
                reason: RejectReason::Collision { with },
            };
        }
        let Ok(id) = self.ids.allocate() else {
            tracing::warn!(target: LOG_TARGET, "zone id space exhausted");
            return Creation::Rejected {
                reason: RejectReason::IdsExhausted,
            };
        };
        let color = ZoneColor::for_index(self.created);
        self.created = self.created.saturating_add(1);
        self.zones.push(Zone {
            id,
            rect,
            color,
            label: self.place_name.clone(),
        });
        self.selected = Some(id);
        tracing::debug!(target: LOG_TARGET, zone = %id, %rect, "zone added");
        Creation::Added { zone: id }
    }

    // -----------------------------------------------------------------------
    // Geometry changes
    // -----------------------------------------------------------------------

    /// Move a zone so its top-left corner lands on the grid point nearest to
    /// `proposed`, clamped into bounds. Ignored on collision.
    pub fn move_zone(&mut self, id: ZoneId, proposed: WorldPos) -> Placement {
        let Some(current) = self.zone(id).map(|zone| zone.rect) else {
            return Placement::ignored(IgnoreReason::UnknownZone);
        };
        let x = clamp_span(self.pitch.snap(proposed.x), current.width, self.size.width);
        let y = clamp_span(self.pitch.snap(proposed.y), current.height, self.size.height);
        self.commit(id, current, current.with_position(WorldPoint::new(x, y)))
    }

    /// Move a zone by a world delta measured from `origin`, its position when
    /// the gesture began.
    pub fn drag_zone(&mut self, id: ZoneId, origin: WorldPoint, delta: WorldDelta) -> Placement {
        let start = WorldPos::from(origin);
        self.move_zone(id, WorldPos::new(start.x + delta.dx, start.y + delta.dy))
    }

    /// Resize a zone by dragging one corner.
    ///
    /// `origin` is the zone geometry when the gesture began and `delta` the
    /// world-space pointer travel since then. The dragged corner moves the
    /// two edges it touches; the opposite edges stay fixed. A moving edge is
    /// clamped to the world bounds and pinned at `fixed edge +/- min side`.
    pub fn resize_zone(
        &mut self,
        id: ZoneId,
        corner: Corner,
        origin: ZoneRect,
        delta: WorldDelta,
    ) -> Placement {
        let Some(current) = self.zone(id).map(|zone| zone.rect) else {
            return Placement::ignored(IgnoreReason::UnknownZone);
        };
        let dx = self.pitch.snap(delta.dx);
        let dy = self.pitch.snap(delta.dy);
        let min = self.min_side;

        let (left, right) = if corner.moves_left() {
            let right = origin.right();
            let left = origin.left().saturating_add(dx).max(0).min(right - min);
            (left, right)
        } else {
            let left = origin.left();
            let right = origin
                .right()
                .saturating_add(dx)
                .min(self.size.width)
                .max(left + min);
            (left, right)
        };
        let (top, bottom) = if corner.moves_top() {
            let bottom = origin.bottom();
            let top = origin.top().saturating_add(dy).max(0).min(bottom - min);
            (top, bottom)
        } else {
            let top = origin.top();
            let bottom = origin
                .bottom()
                .saturating_add(dy)
                .min(self.size.height)
                .max(top + min);
            (top, bottom)
        };

        self.commit(id, current, ZoneRect::from_edges(left, top, right, bottom))
    }

    /// Resize using the zone's current geometry as the origin.
    pub fn resize_zone_by(&mut self, id: ZoneId, corner: Corner, delta: WorldDelta) -> Placement {
        let Some(current) = self.zone(id).map(|zone| zone.rect) else {
            return Placement::ignored(IgnoreReason::UnknownZone);
        };
        self.resize_zone(id, corner, current, delta)
    }

    fn commit(&mut self, id: ZoneId, current: ZoneRect, candidate: ZoneRect) -> Placement {
        if candidate == current {
            return Placement::ignored(IgnoreReason::Unchanged);
        }
        if !self.is_placeable(&candidate) {
            tracing::trace!(target: LOG_TARGET, zone = %id, rect = %candidate, "invalid geometry ignored");
            return Placement::ignored(IgnoreReason::InvalidGeometry);
        }
        if let Some(with) = self.first_collision(&candidate, Some(id)) {
            tracing::trace!(target: LOG_TARGET, zone = %id, rect = %candidate, %with, "placement collides");
            return Placement::ignored(IgnoreReason::Collision { with });
        }
        if let Some(zone) = self.zone_mut(id) {
            zone.rect = candidate;
        }
        tracing::debug!(target: LOG_TARGET, zone = %id, rect = %candidate, "placement applied");
        Placement::Applied { rect: candidate }
    }

    fn is_placeable(&self, rect: &ZoneRect) -> bool {
        rect.width >= self.min_side
            && rect.height >= self.min_side
            && rect.is_on_grid(self.pitch)
            && rect.is_within(&self.size.bounds())
    }

    // -----------------------------------------------------------------------
    // Removal and labels
    // -----------------------------------------------------------------------

    /// Remove a zone. Unknown ids are a no-op. Clears the selection when the
    /// removed zone was selected.
    pub fn delete_zone(&mut self, id: ZoneId) -> Option<Zone> {
        let index = self.zones.iter().position(|zone| zone.id == id)?;
        let removed = self.zones.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(target: LOG_TARGET, zone = %id, "zone deleted");
        Some(removed)
    }

    /// Replace a zone's label. Labels longer than [`MAX_LABEL_CHARS`] are
    /// refused and the old label is kept.
    pub fn rename_zone(&mut self, id: ZoneId, label: &str) -> Result<(), IgnoreReason> {
        let chars = label.chars().count();
        if chars > MAX_LABEL_CHARS {
            tracing::trace!(target: LOG_TARGET, zone = %id, chars, "label too long");
            return Err(IgnoreReason::LabelTooLong { chars });
        }
        let zone = self.zone_mut(id).ok_or(IgnoreReason::UnknownZone)?;
        zone.label = label.to_string();
        Ok(())
    }

    fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|zone| zone.id == id)
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify every placement invariant plus id and selection consistency.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        let mut seen = BTreeSet::new();
        for (index, zone) in self.zones.iter().enumerate() {
            let id = zone.id;
            if !seen.insert(id) {
                return Err(WorldError::DuplicateZoneId { zone: id });
            }
            if id >= self.ids.peek() {
                return Err(WorldError::UnallocatedZoneId {
                    zone: id,
                    next: self.ids.peek(),
                });
            }
            if !zone.rect.is_on_grid(self.pitch) {
                return Err(WorldError::ZoneOffGrid {
                    zone: id,
                    rect: zone.rect,
                });
            }
            if zone.rect.width < self.min_side || zone.rect.height < self.min_side {
                return Err(WorldError::ZoneTooSmall {
                    zone: id,
                    rect: zone.rect,
                });
            }
            if !zone.rect.is_within(&self.size.bounds()) {
                return Err(WorldError::ZoneOutOfBounds {
                    zone: id,
                    rect: zone.rect,
                });
            }
            let chars = zone.label.chars().count();
            if chars > MAX_LABEL_CHARS {
                return Err(WorldError::LabelTooLong { zone: id, chars });
            }
            if let Some(other) = self.zones[index + 1..]
                .iter()
                .find(|other| other.rect.overlaps(&zone.rect))
            {
                return Err(WorldError::ZonesOverlap {
                    first: id,
                    second: other.id,
                });
            }
        }
        if let Some(selected) = self.selected
            && !seen.contains(&selected)
        {
            return Err(WorldError::UnknownSelection { zone: selected });
        }
        Ok(())
    }
}

/// Clamp a start coordinate so `[start, start + span)` fits in `[0, limit]`.
fn clamp_span(start: i32, span: i32, limit: i32) -> i32 {
    start.min(limit.saturating_sub(span)).max(0)
}

/// Structural violations found by [`World::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    DuplicateZoneId { zone: ZoneId },
    UnallocatedZoneId { zone: ZoneId, next: ZoneId },
    ZoneOffGrid { zone: ZoneId, rect: ZoneRect },
    ZoneTooSmall { zone: ZoneId, rect: ZoneRect },
    ZoneOutOfBounds { zone: ZoneId, rect: ZoneRect },
    ZonesOverlap { first: ZoneId, second: ZoneId },
    LabelTooLong { zone: ZoneId, chars: usize },
    UnknownSelection { zone: ZoneId },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateZoneId { zone } => write!(f, "duplicate zone id {zone}"),
            Self::UnallocatedZoneId { zone, next } => {
                write!(f, "zone id {zone} is not below the allocator cursor {next}")
            }
            Self::ZoneOffGrid { zone, rect } => write!(f, "{zone} at {rect} is off the grid"),
            Self::ZoneTooSmall { zone, rect } => {
                write!(f, "{zone} at {rect} is below the minimum size")
            }
            Self::ZoneOutOfBounds { zone, rect } => {
                write!(f, "{zone} at {rect} extends past the world bounds")
            }
            Self::ZonesOverlap { first, second } => write!(f, "{first} overlaps {second}"),
            Self::LabelTooLong { zone, chars } => {
                write!(f, "{zone} label has {chars} chars (max {MAX_LABEL_CHARS})")
            }
            Self::UnknownSelection { zone } => write!(f, "selection {zone} is not a live zone"),
        }
    }
}

impl std::error::Error for WorldError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(&EditorConfig::default()).expect("default config is valid")
    }

    fn added(outcome: Creation) -> ZoneId {
        outcome.zone().expect("zone should be created")
    }

    fn rect_of(world: &World, id: ZoneId) -> ZoneRect {
        world.zone(id).expect("zone exists").rect
    }

    #[test]
    fn add_anchors_to_containing_cell_and_selects() {
        let mut world = world();
        let id = added(world.add_zone(WorldPos::new(47.5, 63.0)));
        assert_eq!(rect_of(&world, id), ZoneRect::new(40, 60, 40, 40));
        assert_eq!(world.selected(), Some(id));
        assert_eq!(world.zone(id).map(|z| z.label.as_str()), Some("Place"));
    }

    #[test]
    fn add_clamps_into_bounds() {
        let mut world = world();
        let id = added(world.add_zone(WorldPos::new(1199.0, 799.0)));
        assert_eq!(rect_of(&world, id), ZoneRect::new(1160, 760, 40, 40));
        let id = added(world.add_zone(WorldPos::new(-30.0, -30.0)));
        assert_eq!(rect_of(&world, id), ZoneRect::new(0, 0, 40, 40));
    }

    #[test]
    fn add_onto_existing_zone_is_rejected() {
        let mut world = world();
        let first = added(world.add_zone_at_cell(2, 3));
        let outcome = world.add_zone_at_cell(3, 4);
        assert_eq!(
            outcome,
            Creation::Rejected {
                reason: RejectReason::Collision { with: first }
            }
        );
        assert_eq!(world.len(), 1);
        assert_eq!(world.selected(), Some(first));
    }

    #[test]
    fn colors_cycle_through_palette() {
        let mut world = world();
        let ids: Vec<_> = (0..7)
            .map(|i| added(world.add_zone_at_cell(i * 2, 0)))
            .collect();
        let colors: Vec<_> = ids
            .iter()
            .map(|id| world.zone(*id).expect("live").color)
            .collect();
        assert_eq!(colors[0], ZoneColor::Sky);
        assert_eq!(colors[5], ZoneColor::Rose);
        assert_eq!(colors[6], ZoneColor::Sky);
    }

    #[test]
    fn move_snaps_and_clamps() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(0, 0));
        assert_eq!(
            world.move_zone(id, WorldPos::new(107.0, 33.0)),
            Placement::Applied {
                rect: ZoneRect::new(100, 40, 40, 40)
            }
        );
        assert_eq!(
            world.move_zone(id, WorldPos::new(5000.0, -80.0)),
            Placement::Applied {
                rect: ZoneRect::new(1160, 0, 40, 40)
            }
        );
    }

    #[test]
    fn colliding_move_keeps_prior_position() {
        let mut world = world();
        let a = added(world.add_zone_at_cell(0, 0));
        let b = added(world.add_zone_at_cell(4, 0));
        let outcome = world.move_zone(b, WorldPos::new(20.0, 0.0));
        assert_eq!(
            outcome,
            Placement::Ignored {
                reason: IgnoreReason::Collision { with: a }
            }
        );
        assert_eq!(rect_of(&world, b), ZoneRect::new(80, 0, 40, 40));
    }

    #[test]
    fn edge_touching_move_is_allowed() {
        let mut world = world();
        let _a = added(world.add_zone_at_cell(0, 0));
        let b = added(world.add_zone_at_cell(4, 0));
        assert!(world.move_zone(b, WorldPos::new(40.0, 0.0)).is_applied());
    }

    #[test]
    fn bottom_right_resize_keeps_position() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(2, 2));
        let origin = rect_of(&world, id);
        let outcome = world.resize_zone(id, Corner::BottomRight, origin, WorldDelta::new(41.0, 18.0));
        assert_eq!(
            outcome,
            Placement::Applied {
                rect: ZoneRect::new(40, 40, 80, 60)
            }
        );
    }

    #[test]
    fn top_left_resize_keeps_bottom_right_corner() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(4, 4));
        let origin = rect_of(&world, id);
        world.resize_zone(id, Corner::TopLeft, origin, WorldDelta::new(-40.0, -20.0));
        let rect = rect_of(&world, id);
        assert_eq!(rect, ZoneRect::new(40, 60, 80, 60));
        assert_eq!(
            rect.corner(Corner::BottomRight),
            origin.corner(Corner::BottomRight)
        );
    }

    #[test]
    fn shrinking_past_minimum_pins_moving_edge() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(4, 4));
        let origin = rect_of(&world, id);
        world.resize_zone(id, Corner::TopLeft, origin, WorldDelta::new(300.0, 300.0));
        assert_eq!(rect_of(&world, id), ZoneRect::new(100, 100, 20, 20));

        let origin = rect_of(&world, id);
        world.resize_zone(id, Corner::TopRight, origin, WorldDelta::new(-500.0, 0.0));
        assert_eq!(rect_of(&world, id), ZoneRect::new(100, 100, 20, 20));
    }

    #[test]
    fn resize_clamps_moving_edges_to_world() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(1, 1));
        let origin = rect_of(&world, id);
        world.resize_zone(id, Corner::TopLeft, origin, WorldDelta::new(-500.0, -500.0));
        assert_eq!(rect_of(&world, id), ZoneRect::new(0, 0, 60, 60));
        world.resize_zone_by(id, Corner::BottomRight, WorldDelta::new(5000.0, 5000.0));
        assert_eq!(rect_of(&world, id), ZoneRect::new(0, 0, 1200, 800));
    }

    #[test]
    fn colliding_resize_is_ignored() {
        let mut world = world();
        let a = added(world.add_zone_at_cell(0, 0));
        let b = added(world.add_zone_at_cell(4, 0));
        let outcome = world.resize_zone_by(a, Corner::BottomRight, WorldDelta::new(60.0, 0.0));
        assert_eq!(
            outcome,
            Placement::Ignored {
                reason: IgnoreReason::Collision { with: b }
            }
        );
        assert_eq!(rect_of(&world, a), ZoneRect::new(0, 0, 40, 40));
    }

    #[test]
    fn copy_offsets_two_steps_and_selects() {
        let mut world = world();
        let source = added(world.add_zone_at_cell(0, 0));
        world.rename_zone(source, "Desk 1").expect("short label");
        let copy = added(world.copy_zone(source));
        assert_eq!(rect_of(&world, copy), ZoneRect::new(40, 40, 40, 40));
        assert_eq!(world.selected(), Some(copy));
        assert_eq!(world.zone(copy).map(|z| z.label.as_str()), Some("Desk 1"));
        assert_eq!(world.zone(source).map(|z| z.color), Some(ZoneColor::Sky));
        assert_eq!(world.zone(copy).map(|z| z.color), Some(ZoneColor::Mint));
    }

    #[test]
    fn copy_that_collides_is_discarded() {
        let mut world = world();
        let source = added(world.add_zone_at_cell(58, 38));
        let outcome = world.copy_zone(source);
        assert_eq!(
            outcome,
            Creation::Rejected {
                reason: RejectReason::Collision { with: source }
            }
        );
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn delete_is_idempotent_and_clears_selection() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(0, 0));
        assert!(world.delete_zone(id).is_some());
        assert_eq!(world.selected(), None);
        let snapshot = world.clone();
        assert!(world.delete_zone(id).is_none());
        assert_eq!(world, snapshot);
    }

    #[test]
    fn stale_ids_are_noops() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(0, 0));
        world.delete_zone(id);
        assert_eq!(
            world.move_zone(id, WorldPos::new(100.0, 100.0)),
            Placement::Ignored {
                reason: IgnoreReason::UnknownZone
            }
        );
        assert!(!world.select(id));
        assert_eq!(
            world.copy_zone(id),
            Creation::Rejected {
                reason: RejectReason::UnknownZone
            }
        );
    }

    #[test]
    fn rename_caps_label_length() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(0, 0));
        assert_eq!(world.rename_zone(id, &"x".repeat(256)), Ok(()));
        assert_eq!(
            world.rename_zone(id, &"y".repeat(257)),
            Err(IgnoreReason::LabelTooLong { chars: 257 })
        );
        assert_eq!(world.zone(id).map(|z| z.label.len()), Some(256));
        world.rename_zone(id, "   ").expect("blank label is allowed");
        assert_eq!(
            world.zone(id).map(Zone::display_label),
            Some(LABEL_PLACEHOLDER)
        );
    }

    #[test]
    fn zone_at_prefers_topmost() {
        let mut world = world();
        let id = added(world.add_zone_at_cell(1, 1));
        assert_eq!(world.zone_at(WorldPos::new(25.0, 25.0)), Some(id));
        assert_eq!(world.zone_at(WorldPos::new(60.0, 25.0)), None);
    }

    #[test]
    fn invariant_check_catches_overlap() {
        let mut world = world();
        let a = added(world.add_zone_at_cell(0, 0));
        let b = added(world.add_zone_at_cell(4, 0));
        assert_eq!(world.check_invariants(), Ok(()));
        if let Some(zone) = world.zone_mut(b) {
            zone.rect = ZoneRect::new(20, 0, 40, 40);
        }
        assert_eq!(
            world.check_invariants(),
            Err(WorldError::ZonesOverlap { first: a, second: b })
        );
    }

    #[test]
    fn outcomes_serialize_with_tags() {
        let json = serde_json::to_string(&Placement::Ignored {
            reason: IgnoreReason::Unchanged,
        })
        .expect("serialize");
        assert_eq!(json, r#"{"outcome":"ignored","reason":{"reason":"unchanged"}}"#);
    }
}
