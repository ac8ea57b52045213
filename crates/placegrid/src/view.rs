#![forbid(unsafe_code)]

//! Derived, render-ready view of an [`EditorState`].
//!
//! Everything here is recomputed from the state on demand and never fed back
//! into it.

use placegrid_core::{Corner, ScreenPoint, ScreenRect, ZoneId};
use placegrid_layout::{GestureKind, ZoneColor};
use serde::Serialize;

use crate::editor::EditorState;

/// A corner handle of the selected zone, in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandleView {
    pub corner: Corner,
    pub center: ScreenPoint,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneView {
    pub id: ZoneId,
    pub rect: ScreenRect,
    pub color: ZoneColor,
    /// Label to draw; the placeholder when the zone has none.
    pub label: String,
    pub selected: bool,
    /// Empty unless `selected`.
    pub handles: Vec<HandleView>,
}

/// Screen-space snapshot of the editor for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub open: bool,
    pub scale: f64,
    pub offset: ScreenPoint,
    pub viewport: ScreenRect,
    /// The whole world on screen; may extend past the viewport.
    pub world: ScreenRect,
    /// Grid line spacing in screen pixels.
    pub grid_step: f64,
    /// Zones in paint order (last is topmost).
    pub zones: Vec<ZoneView>,
    pub gesture: Option<GestureKind>,
}

impl EditorView {
    #[must_use]
    pub fn from_state(state: &EditorState) -> Self {
        let camera = state.camera();
        let world = state.world();
        let viewport = camera.viewport();
        let handle_radius = state.interaction().handle_radius();
        let selected = world.selected();

        let zones = world
            .zones()
            .iter()
            .map(|zone| {
                let is_selected = selected == Some(zone.id);
                let handles = if is_selected {
                    Corner::ALL
                        .iter()
                        .map(|&corner| HandleView {
                            corner,
                            center: camera.world_to_screen(zone.rect.corner(corner).into()),
                            radius: handle_radius,
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                ZoneView {
                    id: zone.id,
                    rect: camera.world_rect_to_screen(zone.rect),
                    color: zone.color,
                    label: zone.display_label().to_owned(),
                    selected: is_selected,
                    handles,
                }
            })
            .collect();

        Self {
            open: state.is_open(),
            scale: camera.scale(),
            offset: camera.offset(),
            viewport: ScreenRect::new(0.0, 0.0, viewport.width, viewport.height),
            world: camera.world_rect_to_screen(world.size().bounds()),
            grid_step: f64::from(world.pitch().get()) * camera.scale(),
            zones,
            gesture: state.interaction().state().kind(),
        }
    }

    /// The view of one zone, if it is live.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&ZoneView> {
        self.zones.iter().find(|zone| zone.id == id)
    }
}
