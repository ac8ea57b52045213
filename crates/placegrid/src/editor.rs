#![forbid(unsafe_code)]

//! Editor state and the event reducer.
//!
//! [`EditorState`] bundles the world, camera, gesture controller and
//! reservation ledger into one owned, serializable value. Every input, from
//! pointer events to reservation forms, is an [`EditorEvent`] applied in
//! order through [`EditorState::apply`] (in place) or [`apply_event`] (pure).
//!
//! While the editor is closed only [`EditorEvent::Open`] has an effect.

use chrono::NaiveDateTime;
use placegrid_booking::{
    LedgerError, Reservation, ReservationLedger, ReservationRejection, ReservationRequest,
};
use placegrid_core::{
    Corner, EditorConfig, PointerEvent, ScreenPoint, ScreenSize, WorldDelta, WorldPos, ZoneId,
};
use placegrid_layout::{
    Camera, Creation, GestureTransition, IgnoreReason, InteractionController, Placement, World,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const LOG_TARGET: &str = "placegrid.editor";

/// One input to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    Open,
    Close,
    Pointer {
        pointer: PointerEvent,
    },
    /// Wheel or pinch zoom around a screen point.
    Wheel {
        pivot: ScreenPoint,
        factor: f64,
    },
    SetZoom {
        scale: f64,
    },
    ZoomToFit,
    Pan {
        dx: f64,
        dy: f64,
    },
    ResizeViewport {
        viewport: ScreenSize,
    },
    /// Add a default zone at `at`, or at the center of the visible area.
    AddZone {
        #[serde(default)]
        at: Option<WorldPos>,
    },
    MoveZone {
        zone: ZoneId,
        to: WorldPos,
    },
    ResizeZone {
        zone: ZoneId,
        corner: Corner,
        delta: WorldDelta,
    },
    CopyZone {
        zone: ZoneId,
    },
    DeleteZone {
        zone: ZoneId,
    },
    /// Select a zone, or clear the selection with `None`.
    Select {
        zone: Option<ZoneId>,
    },
    RenameZone {
        zone: ZoneId,
        label: String,
    },
    AddReservation {
        zone: ZoneId,
        request: ReservationRequest,
        now: NaiveDateTime,
    },
    DeleteReservation {
        zone: ZoneId,
        index: usize,
    },
}

impl EditorEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Pointer { .. } => "pointer",
            Self::Wheel { .. } => "wheel",
            Self::SetZoom { .. } => "set_zoom",
            Self::ZoomToFit => "zoom_to_fit",
            Self::Pan { .. } => "pan",
            Self::ResizeViewport { .. } => "resize_viewport",
            Self::AddZone { .. } => "add_zone",
            Self::MoveZone { .. } => "move_zone",
            Self::ResizeZone { .. } => "resize_zone",
            Self::CopyZone { .. } => "copy_zone",
            Self::DeleteZone { .. } => "delete_zone",
            Self::Select { .. } => "select",
            Self::RenameZone { .. } => "rename_zone",
            Self::AddReservation { .. } => "add_reservation",
            Self::DeleteReservation { .. } => "delete_reservation",
        }
    }
}

/// Why an event had no effect at the editor level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorNoopReason {
    EditorClosed,
    UnknownZone,
}

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EditorEffect {
    Opened,
    Closed {
        canceled_gesture: bool,
    },
    Gesture {
        transition: GestureTransition,
    },
    Camera {
        changed: bool,
    },
    Created {
        creation: Creation,
    },
    Placed {
        zone: ZoneId,
        placement: Placement,
    },
    Deleted {
        zone: ZoneId,
        existed: bool,
        purged_reservations: usize,
    },
    Selected {
        zone: Option<ZoneId>,
    },
    Renamed {
        zone: ZoneId,
    },
    RenameIgnored {
        zone: ZoneId,
        reason: IgnoreReason,
    },
    ReservationAdded {
        reservation: Reservation,
    },
    /// Validation refused the booking; `message` is for the user.
    ReservationRejected {
        zone: ZoneId,
        rejection: ReservationRejection,
        message: String,
    },
    ReservationDeleted {
        zone: ZoneId,
        index: usize,
        removed: Option<Reservation>,
    },
    Noop {
        reason: EditorNoopReason,
    },
}

/// One applied event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorTransition {
    pub transition_id: u64,
    pub effect: EditorEffect,
}

/// Complete editor state. Plain owned data; clone it to fork history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    config: EditorConfig,
    world: World,
    camera: Camera,
    interaction: InteractionController,
    ledger: ReservationLedger,
    open: bool,
    transition_counter: u64,
}

impl EditorState {
    /// Fresh, closed editor for `config`.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            world: World::new(&config)?,
            camera: Camera::from_config(&config),
            interaction: InteractionController::from_config(&config)?,
            ledger: ReservationLedger::from_config(&config)?,
            config,
            open: false,
            transition_counter: 0,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub const fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    #[must_use]
    pub const fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Reservations of one zone, sorted by `(date, start)`.
    pub fn reservations(&self, zone: ZoneId) -> Result<Vec<Reservation>> {
        Ok(self.ledger.list_reservations(zone)?)
    }

    /// Apply one event in place.
    ///
    /// Geometric rejections and reservation validation failures are effects,
    /// not errors. Errors are reserved for malformed pointer events and
    /// reservation store failures; state is unchanged when one is returned.
    pub fn apply(&mut self, event: &EditorEvent) -> Result<EditorTransition> {
        let _span = tracing::debug_span!(target: LOG_TARGET, "editor.apply", event = event.kind())
            .entered();

        let effect = if self.open {
            self.apply_open(event)?
        } else if matches!(event, EditorEvent::Open) {
            self.open = true;
            tracing::debug!(target: LOG_TARGET, "editor opened");
            EditorEffect::Opened
        } else {
            tracing::trace!(target: LOG_TARGET, "event ignored while closed");
            EditorEffect::Noop {
                reason: EditorNoopReason::EditorClosed,
            }
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        Ok(EditorTransition {
            transition_id: self.transition_counter,
            effect,
        })
    }

    fn apply_open(&mut self, event: &EditorEvent) -> Result<EditorEffect> {
        let effect = match event {
            EditorEvent::Open => EditorEffect::Opened,
            EditorEvent::Close => {
                let canceled_gesture = self.interaction.force_cancel().is_some();
                self.open = false;
                tracing::debug!(target: LOG_TARGET, canceled_gesture, "editor closed");
                EditorEffect::Closed { canceled_gesture }
            }
            EditorEvent::Pointer { pointer } => {
                let transition =
                    self.interaction
                        .apply(pointer, &mut self.world, &mut self.camera)?;
                EditorEffect::Gesture { transition }
            }
            EditorEvent::Wheel { pivot, factor } => EditorEffect::Camera {
                changed: self.camera.zoom_at(*factor, *pivot),
            },
            EditorEvent::SetZoom { scale } => EditorEffect::Camera {
                changed: self.camera.set_zoom(*scale),
            },
            EditorEvent::ZoomToFit => EditorEffect::Camera {
                changed: self.camera.zoom_to_fit(),
            },
            EditorEvent::Pan { dx, dy } => EditorEffect::Camera {
                changed: self.camera.pan(*dx, *dy),
            },
            EditorEvent::ResizeViewport { viewport } => EditorEffect::Camera {
                changed: self.camera.set_viewport(*viewport),
            },
            EditorEvent::AddZone { at } => {
                let at = at.unwrap_or_else(|| self.visible_center_anchor());
                EditorEffect::Created {
                    creation: self.world.add_zone(at),
                }
            }
            EditorEvent::MoveZone { zone, to } => EditorEffect::Placed {
                zone: *zone,
                placement: self.world.move_zone(*zone, *to),
            },
            EditorEvent::ResizeZone {
                zone,
                corner,
                delta,
            } => EditorEffect::Placed {
                zone: *zone,
                placement: self.world.resize_zone_by(*zone, *corner, *delta),
            },
            EditorEvent::CopyZone { zone } => EditorEffect::Created {
                creation: self.world.copy_zone(*zone),
            },
            EditorEvent::DeleteZone { zone } => {
                let purged_reservations = self.ledger.purge_zone(*zone)?;
                let existed = self.world.delete_zone(*zone).is_some();
                EditorEffect::Deleted {
                    zone: *zone,
                    existed,
                    purged_reservations,
                }
            }
            EditorEvent::Select { zone: Some(zone) } => {
                if self.world.select(*zone) {
                    EditorEffect::Selected { zone: Some(*zone) }
                } else {
                    EditorEffect::Noop {
                        reason: EditorNoopReason::UnknownZone,
                    }
                }
            }
            EditorEvent::Select { zone: None } => {
                self.world.clear_selection();
                EditorEffect::Selected { zone: None }
            }
            EditorEvent::RenameZone { zone, label } => match self.world.rename_zone(*zone, label) {
                Ok(()) => EditorEffect::Renamed { zone: *zone },
                Err(reason) => EditorEffect::RenameIgnored {
                    zone: *zone,
                    reason,
                },
            },
            EditorEvent::AddReservation { zone, request, now } => {
                self.add_reservation(*zone, request, *now)?
            }
            EditorEvent::DeleteReservation { zone, index } => EditorEffect::ReservationDeleted {
                zone: *zone,
                index: *index,
                removed: self.ledger.delete_reservation(*zone, *index)?,
            },
        };
        Ok(effect)
    }

    /// Anchor that centers a default zone on the middle of the viewport.
    fn visible_center_anchor(&self) -> WorldPos {
        let center = self.camera.screen_to_world(self.camera.viewport().center());
        let half = f64::from(self.world.default_zone_side()) / 2.0;
        WorldPos::new(center.x - half, center.y - half)
    }

    fn add_reservation(
        &mut self,
        zone: ZoneId,
        request: &ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<EditorEffect> {
        if self.world.zone(zone).is_none() {
            return Ok(EditorEffect::Noop {
                reason: EditorNoopReason::UnknownZone,
            });
        }
        match self.ledger.add_reservation(zone, request, now) {
            Ok(reservation) => Ok(EditorEffect::ReservationAdded { reservation }),
            Err(LedgerError::Rejected(rejection)) => {
                Ok(EditorEffect::ReservationRejected {
                    zone,
                    message: rejection.to_string(),
                    rejection,
                })
            }
            Err(error) => Err(Error::Ledger(error)),
        }
    }
}

/// Pure reducer: apply `event` to a copy of `state`.
///
/// On error the input state is untouched and no new state is produced.
pub fn apply_event(state: &EditorState, event: &EditorEvent) -> Result<EditorState> {
    let mut next = state.clone();
    next.apply(event)?;
    Ok(next)
}
