#![forbid(unsafe_code)]

//! Pointer hit testing.
//!
//! Resolution order: corner handles of the selected zone, then zone bodies
//! from top to bottom, then the background.

use placegrid_core::{Corner, ScreenPoint, WorldPos, ZoneId};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::world::World;

/// What a screen point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum HitTarget {
    Background,
    Zone { zone: ZoneId },
    Handle { zone: ZoneId, corner: Corner },
}

/// Resolve `point` against the world as seen through `camera`.
///
/// Handles are hit within `handle_radius` screen pixels of the corner; when
/// two corners are in range (tiny zones when zoomed out) the nearer wins.
#[must_use]
pub fn hit_test(world: &World, camera: &Camera, point: ScreenPoint, handle_radius: f64) -> HitTarget {
    if let Some(zone) = world.selected_zone() {
        let mut best: Option<(f64, Corner)> = None;
        for corner in Corner::ALL {
            let at = camera.world_to_screen(WorldPos::from(zone.rect.corner(corner)));
            let distance = at.distance_to(point);
            if distance <= handle_radius && best.is_none_or(|(nearest, _)| distance < nearest) {
                best = Some((distance, corner));
            }
        }
        if let Some((_, corner)) = best {
            return HitTarget::Handle {
                zone: zone.id,
                corner,
            };
        }
    }
    match world.zone_at(camera.screen_to_world(point)) {
        Some(zone) => HitTarget::Zone { zone },
        None => HitTarget::Background,
    }
}
