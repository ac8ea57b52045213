#![forbid(unsafe_code)]

//! Pointer gesture state machine.
//!
//! ```text
//! Idle --down(background)--> Panning --up without travel--> Idle (+ tap create)
//!      --down(zone body)---> DraggingZone ----------up/cancel--> Idle
//!      --down(handle)------> ResizingZone(corner) --up/cancel--> Idle
//! ```
//!
//! A gesture captures the pointer that started it. Downs during an active
//! gesture and events from other pointers are reported as no-ops. Moves
//! while dragging or resizing are measured from the gesture start, so the
//! zone follows the pointer even after a collision held it back.

use std::fmt;

use placegrid_core::{
    Corner, EditorConfig, PointerEvent, PointerEventError, ScreenPoint, WorldPoint, WorldPos,
    ZoneId, ZoneRect,
};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::hit::{HitTarget, hit_test};
use crate::world::{Creation, Placement, World};

const LOG_TARGET: &str = "placegrid.layout";

/// Active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureState {
    Idle,
    Panning {
        pointer_id: u32,
        origin: ScreenPoint,
        last: ScreenPoint,
        /// Set once travel exceeds the tap slop; from then on this is a pan.
        engaged: bool,
    },
    DraggingZone {
        pointer_id: u32,
        zone: ZoneId,
        origin: ScreenPoint,
        start: WorldPoint,
    },
    ResizingZone {
        pointer_id: u32,
        zone: ZoneId,
        corner: Corner,
        origin: ScreenPoint,
        start: ZoneRect,
    },
}

impl GestureState {
    #[must_use]
    pub const fn pointer_id(&self) -> Option<u32> {
        match *self {
            Self::Idle => None,
            Self::Panning { pointer_id, .. }
            | Self::DraggingZone { pointer_id, .. }
            | Self::ResizingZone { pointer_id, .. } => Some(pointer_id),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Option<GestureKind> {
        match self {
            Self::Idle => None,
            Self::Panning { .. } => Some(GestureKind::Pan),
            Self::DraggingZone { .. } => Some(GestureKind::Drag),
            Self::ResizingZone { .. } => Some(GestureKind::Resize),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Pan,
    Drag,
    Resize,
}

/// Explicit diagnostics for events that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureNoopReason {
    IdleWithoutActiveGesture,
    ActiveGestureInProgress,
    PointerMismatch,
    BelowTapSlop,
}

/// Effect emitted by one step of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum GestureEffect {
    PanArmed {
        pointer_id: u32,
        origin: ScreenPoint,
    },
    Panned {
        dx: f64,
        dy: f64,
        camera_moved: bool,
    },
    DragStarted {
        zone: ZoneId,
        start: WorldPoint,
    },
    ResizeStarted {
        zone: ZoneId,
        corner: Corner,
        start: ZoneRect,
    },
    Placed {
        zone: ZoneId,
        placement: Placement,
    },
    Tapped {
        at: WorldPos,
        creation: Creation,
    },
    Ended {
        gesture: GestureKind,
        canceled: bool,
    },
    Noop {
        reason: GestureNoopReason,
    },
}

/// One machine step with its before/after state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTransition {
    pub transition_id: u64,
    pub from: GestureState,
    pub to: GestureState,
    pub effect: GestureEffect,
}

/// Resolves raw pointer events into pan, drag, resize or tap-create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionController {
    state: GestureState,
    tap_slop: f64,
    handle_radius: f64,
    transition_counter: u64,
}

impl Default for InteractionController {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            state: GestureState::Idle,
            tap_slop: config.tap_slop,
            handle_radius: config.handle_radius,
            transition_counter: 0,
        }
    }
}

impl InteractionController {
    /// Controller with explicit thresholds, both in screen pixels.
    pub fn new(tap_slop: f64, handle_radius: f64) -> Result<Self, InteractionError> {
        if !tap_slop.is_finite() || tap_slop < 0.0 {
            return Err(InteractionError::InvalidThreshold {
                field: "tap_slop",
                value: tap_slop,
            });
        }
        if !handle_radius.is_finite() || handle_radius <= 0.0 {
            return Err(InteractionError::InvalidThreshold {
                field: "handle_radius",
                value: handle_radius,
            });
        }
        Ok(Self {
            state: GestureState::Idle,
            tap_slop,
            handle_radius,
            transition_counter: 0,
        })
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self, InteractionError> {
        Self::new(config.tap_slop, config.handle_radius)
    }

    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    #[must_use]
    pub const fn tap_slop(&self) -> f64 {
        self.tap_slop
    }

    #[must_use]
    pub const fn handle_radius(&self) -> f64 {
        self.handle_radius
    }

    /// Drop any active gesture without touching the world. Geometry applied
    /// so far is kept. Returns `None` when already idle.
    pub fn force_cancel(&mut self) -> Option<GestureTransition> {
        let from = self.state;
        let gesture = from.kind()?;
        self.state = GestureState::Idle;
        Some(self.record(
            from,
            GestureEffect::Ended {
                gesture,
                canceled: true,
            },
        ))
    }

    /// Apply one pointer event.
    ///
    /// Only malformed events are errors; every well-formed event produces a
    /// transition, possibly a [`GestureEffect::Noop`].
    pub fn apply(
        &mut self,
        event: &PointerEvent,
        world: &mut World,
        camera: &mut Camera,
    ) -> Result<GestureTransition, InteractionError> {
        event.validate().map_err(InteractionError::InvalidEvent)?;

        let from = self.state;
        let effect = match (from, *event) {
            (GestureState::Idle, PointerEvent::Down { pointer_id, position }) => {
                self.begin(pointer_id, position, world, camera)
            }
            (GestureState::Idle, _) => GestureEffect::Noop {
                reason: GestureNoopReason::IdleWithoutActiveGesture,
            },
            (_, PointerEvent::Down { .. }) => GestureEffect::Noop {
                reason: GestureNoopReason::ActiveGestureInProgress,
            },
            (active, event) if active.pointer_id() != Some(event.pointer_id()) => {
                GestureEffect::Noop {
                    reason: GestureNoopReason::PointerMismatch,
                }
            }
            (
                GestureState::Panning {
                    pointer_id,
                    origin,
                    last,
                    engaged,
                },
                PointerEvent::Move { position, .. },
            ) => {
                if !engaged && position.distance_to(origin) <= self.tap_slop {
                    GestureEffect::Noop {
                        reason: GestureNoopReason::BelowTapSlop,
                    }
                } else {
                    let (dx, dy) = position.delta_from(last);
                    let camera_moved = camera.pan(dx, dy);
                    self.state = GestureState::Panning {
                        pointer_id,
                        origin,
                        last: position,
                        engaged: true,
                    };
                    GestureEffect::Panned {
                        dx,
                        dy,
                        camera_moved,
                    }
                }
            }
            (
                GestureState::DraggingZone {
                    zone,
                    origin,
                    start,
                    ..
                },
                PointerEvent::Move { position, .. },
            ) => {
                let (dx, dy) = position.delta_from(origin);
                let placement = world.drag_zone(zone, start, camera.screen_delta_to_world(dx, dy));
                GestureEffect::Placed { zone, placement }
            }
            (
                GestureState::ResizingZone {
                    zone,
                    corner,
                    origin,
                    start,
                    ..
                },
                PointerEvent::Move { position, .. },
            ) => {
                let (dx, dy) = position.delta_from(origin);
                let delta = camera.screen_delta_to_world(dx, dy);
                let placement = world.resize_zone(zone, corner, start, delta);
                GestureEffect::Placed { zone, placement }
            }
            (
                GestureState::Panning {
                    origin,
                    engaged: false,
                    ..
                },
                PointerEvent::Up { position, .. },
            ) if position.distance_to(origin) <= self.tap_slop => {
                self.state = GestureState::Idle;
                let at = camera.screen_to_world(origin);
                let creation = world.add_zone(at);
                tracing::debug!(target: LOG_TARGET, ?creation, "tap on background");
                GestureEffect::Tapped { at, creation }
            }
            (active, PointerEvent::Up { .. } | PointerEvent::Cancel { .. }) => {
                self.state = GestureState::Idle;
                GestureEffect::Ended {
                    gesture: active.kind().unwrap_or(GestureKind::Pan),
                    canceled: matches!(event, PointerEvent::Cancel { .. }),
                }
            }
        };

        if let GestureEffect::Noop { reason } = effect {
            tracing::trace!(target: LOG_TARGET, ?reason, "pointer event ignored");
        }
        Ok(self.record(from, effect))
    }

    fn begin(
        &mut self,
        pointer_id: u32,
        position: ScreenPoint,
        world: &mut World,
        camera: &Camera,
    ) -> GestureEffect {
        match hit_test(world, camera, position, self.handle_radius) {
            HitTarget::Handle { zone, corner } => {
                let Some(start) = world.zone(zone).map(|z| z.rect) else {
                    return self.arm_pan(pointer_id, position);
                };
                world.select(zone);
                self.state = GestureState::ResizingZone {
                    pointer_id,
                    zone,
                    corner,
                    origin: position,
                    start,
                };
                tracing::debug!(target: LOG_TARGET, %zone, ?corner, "resize started");
                GestureEffect::ResizeStarted {
                    zone,
                    corner,
                    start,
                }
            }
            HitTarget::Zone { zone } => {
                let Some(start) = world.zone(zone).map(|z| z.rect.position()) else {
                    return self.arm_pan(pointer_id, position);
                };
                world.select(zone);
                self.state = GestureState::DraggingZone {
                    pointer_id,
                    zone,
                    origin: position,
                    start,
                };
                tracing::debug!(target: LOG_TARGET, %zone, "drag started");
                GestureEffect::DragStarted { zone, start }
            }
            HitTarget::Background => self.arm_pan(pointer_id, position),
        }
    }

    fn arm_pan(&mut self, pointer_id: u32, origin: ScreenPoint) -> GestureEffect {
        self.state = GestureState::Panning {
            pointer_id,
            origin,
            last: origin,
            engaged: false,
        };
        GestureEffect::PanArmed { pointer_id, origin }
    }

    fn record(&mut self, from: GestureState, effect: GestureEffect) -> GestureTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        GestureTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        }
    }
}

/// Errors from constructing or driving the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionError {
    InvalidEvent(PointerEventError),
    InvalidThreshold { field: &'static str, value: f64 },
}

impl fmt::Display for InteractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEvent(error) => write!(f, "invalid pointer event: {error}"),
            Self::InvalidThreshold { field, value } => {
                write!(f, "invalid {field} value {value}")
            }
        }
    }
}

impl std::error::Error for InteractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEvent(error) => Some(error),
            Self::InvalidThreshold { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::IgnoreReason;
    use placegrid_core::ZoneRect;

    struct Rig {
        world: World,
        camera: Camera,
        controller: InteractionController,
    }

    impl Rig {
        fn new() -> Self {
            let config = EditorConfig::default();
            Self {
                world: World::new(&config).expect("valid config"),
                camera: Camera::from_config(&config),
                controller: InteractionController::from_config(&config).expect("valid thresholds"),
            }
        }

        fn send(&mut self, event: PointerEvent) -> GestureTransition {
            self.controller
                .apply(&event, &mut self.world, &mut self.camera)
                .expect("well-formed event")
        }

        fn zone(&mut self, column: i32, row: i32) -> ZoneId {
            self.world
                .add_zone_at_cell(column, row)
                .zone()
                .expect("free cell")
        }
    }

    #[test]
    fn tap_on_background_creates_zone() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::down(1, 65.0, 45.0));
        rig.send(PointerEvent::moved(1, 66.0, 46.0));
        let t = rig.send(PointerEvent::up(1, 66.0, 46.0));
        let GestureEffect::Tapped { creation, .. } = t.effect else {
            panic!("expected tap, got {:?}", t.effect);
        };
        let id = creation.zone().expect("zone created");
        assert_eq!(
            rig.world.zone(id).map(|z| z.rect),
            Some(ZoneRect::new(60, 40, 40, 40))
        );
        assert_eq!(t.to, GestureState::Idle);
        assert_eq!(rig.camera.offset(), ScreenPoint::new(0.0, 0.0));
    }

    #[test]
    fn pan_engages_after_slop_and_skips_tap() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::down(1, 300.0, 300.0));
        let t = rig.send(PointerEvent::moved(1, 298.0, 299.0));
        assert_eq!(
            t.effect,
            GestureEffect::Noop {
                reason: GestureNoopReason::BelowTapSlop
            }
        );
        let t = rig.send(PointerEvent::moved(1, 250.0, 280.0));
        assert!(matches!(
            t.effect,
            GestureEffect::Panned {
                camera_moved: true,
                ..
            }
        ));
        assert_eq!(rig.camera.offset(), ScreenPoint::new(-50.0, -20.0));
        let t = rig.send(PointerEvent::up(1, 250.0, 280.0));
        assert_eq!(
            t.effect,
            GestureEffect::Ended {
                gesture: GestureKind::Pan,
                canceled: false
            }
        );
        assert!(rig.world.is_empty());
    }

    #[test]
    fn drag_is_anchored_to_gesture_start() {
        let mut rig = Rig::new();
        let id = rig.zone(2, 2);
        rig.world.clear_selection();
        let t = rig.send(PointerEvent::down(1, 60.0, 60.0));
        assert!(matches!(t.effect, GestureEffect::DragStarted { .. }));
        assert_eq!(rig.world.selected(), Some(id));
        rig.send(PointerEvent::moved(1, 75.0, 60.0));
        rig.send(PointerEvent::moved(1, 101.0, 60.0));
        assert_eq!(
            rig.world.zone(id).map(|z| z.rect),
            Some(ZoneRect::new(80, 40, 40, 40))
        );
        rig.send(PointerEvent::up(1, 101.0, 60.0));
        assert!(!rig.controller.is_active());
    }

    #[test]
    fn drag_into_neighbor_sticks() {
        let mut rig = Rig::new();
        let _left = rig.zone(0, 0);
        let right = rig.zone(4, 0);
        rig.world.clear_selection();
        rig.send(PointerEvent::down(1, 100.0, 20.0));
        let t = rig.send(PointerEvent::moved(1, 40.0, 20.0));
        assert!(matches!(
            t.effect,
            GestureEffect::Placed {
                placement: Placement::Ignored {
                    reason: IgnoreReason::Collision { .. }
                },
                ..
            }
        ));
        assert_eq!(
            rig.world.zone(right).map(|z| z.rect),
            Some(ZoneRect::new(80, 0, 40, 40))
        );
    }

    #[test]
    fn resize_from_selected_handle() {
        let mut rig = Rig::new();
        let id = rig.zone(2, 2);
        let t = rig.send(PointerEvent::down(1, 80.0, 80.0));
        assert_eq!(
            t.effect,
            GestureEffect::ResizeStarted {
                zone: id,
                corner: Corner::BottomRight,
                start: ZoneRect::new(40, 40, 40, 40)
            }
        );
        rig.send(PointerEvent::moved(1, 120.0, 100.0));
        rig.send(PointerEvent::cancel(1));
        assert_eq!(
            rig.world.zone(id).map(|z| z.rect),
            Some(ZoneRect::new(40, 40, 80, 60))
        );
    }

    #[test]
    fn drag_deltas_are_inverse_scaled() {
        let mut rig = Rig::new();
        let id = rig.zone(0, 0);
        rig.world.clear_selection();
        rig.camera.set_zoom(2.0);
        rig.camera.pan(10_000.0, 10_000.0);
        let origin = rig.camera.world_to_screen(WorldPos::new(20.0, 20.0));
        assert_eq!(origin, ScreenPoint::new(40.0, 40.0));
        rig.send(PointerEvent::down(1, origin.x, origin.y));
        rig.send(PointerEvent::moved(1, origin.x + 80.0, origin.y));
        assert_eq!(
            rig.world.zone(id).map(|z| z.rect.position()),
            Some(WorldPoint::new(40, 0))
        );
    }

    #[test]
    fn one_gesture_at_a_time() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::down(1, 300.0, 300.0));
        let t = rig.send(PointerEvent::down(2, 10.0, 10.0));
        assert_eq!(
            t.effect,
            GestureEffect::Noop {
                reason: GestureNoopReason::ActiveGestureInProgress
            }
        );
        let t = rig.send(PointerEvent::up(2, 10.0, 10.0));
        assert_eq!(
            t.effect,
            GestureEffect::Noop {
                reason: GestureNoopReason::PointerMismatch
            }
        );
        assert!(rig.controller.is_active());
    }

    #[test]
    fn idle_ignores_moves_and_ups() {
        let mut rig = Rig::new();
        let t = rig.send(PointerEvent::moved(1, 5.0, 5.0));
        assert_eq!(
            t.effect,
            GestureEffect::Noop {
                reason: GestureNoopReason::IdleWithoutActiveGesture
            }
        );
        assert_eq!(t.transition_id, 1);
    }

    #[test]
    fn cancel_never_creates_a_zone() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::down(1, 300.0, 300.0));
        let t = rig.send(PointerEvent::cancel(1));
        assert_eq!(
            t.effect,
            GestureEffect::Ended {
                gesture: GestureKind::Pan,
                canceled: true
            }
        );
        assert!(rig.world.is_empty());
    }

    #[test]
    fn deleted_zone_mid_gesture_is_noop() {
        let mut rig = Rig::new();
        let id = rig.zone(2, 2);
        rig.world.clear_selection();
        rig.send(PointerEvent::down(1, 60.0, 60.0));
        rig.world.delete_zone(id);
        let t = rig.send(PointerEvent::moved(1, 120.0, 60.0));
        assert_eq!(
            t.effect,
            GestureEffect::Placed {
                zone: id,
                placement: Placement::Ignored {
                    reason: IgnoreReason::UnknownZone
                }
            }
        );
    }

    #[test]
    fn force_cancel_resets_active_gesture() {
        let mut rig = Rig::new();
        assert!(rig.controller.force_cancel().is_none());
        rig.send(PointerEvent::down(1, 300.0, 300.0));
        let t = rig.controller.force_cancel().expect("was active");
        assert_eq!(t.to, GestureState::Idle);
    }

    #[test]
    fn malformed_events_are_errors() {
        let mut rig = Rig::new();
        let result = rig.controller.apply(
            &PointerEvent::down(0, 1.0, 1.0),
            &mut rig.world,
            &mut rig.camera,
        );
        assert_eq!(
            result,
            Err(InteractionError::InvalidEvent(PointerEventError::ZeroPointerId))
        );
        assert!(InteractionController::new(-1.0, 8.0).is_err());
        assert!(InteractionController::new(4.0, 0.0).is_err());
    }
}
