#![forbid(unsafe_code)]

//! Pan/zoom camera over the world canvas.
//!
//! `screen = world * scale + offset`. The offset is re-clamped after every
//! change so that, on each axis where the scaled world covers the viewport,
//! no area outside the world is visible. On an axis where the scaled world is
//! narrower than the viewport the world is centered instead.
//!
//! The lower zoom bound is raised dynamically so the scaled world is never
//! smaller than the viewport:
//! `effective_min = max(min_zoom, viewport_w / world_w, viewport_h / world_h)`.

use std::fmt;

use placegrid_core::{
    EditorConfig, ScreenPoint, ScreenRect, ScreenSize, WorldDelta, WorldPos, WorldSize, ZoneRect,
};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "placegrid.layout";

/// Relative slack for float comparisons on restored state.
const TOLERANCE: f64 = 1e-9;

/// Viewport transform between world and screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    viewport: ScreenSize,
    world: WorldSize,
    min_zoom: f64,
    max_zoom: f64,
}

impl Camera {
    /// Camera at scale 1 (or the nearest allowed scale) showing the world's
    /// top-left corner.
    #[must_use]
    pub fn new(world: WorldSize, viewport: ScreenSize, min_zoom: f64, max_zoom: f64) -> Self {
        let mut camera = Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            viewport,
            world,
            min_zoom,
            max_zoom,
        };
        camera.scale = camera.clamp_scale(1.0);
        camera.clamp_offset();
        camera
    }

    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.world, config.viewport, config.min_zoom, config.max_zoom)
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of the world origin.
    #[must_use]
    pub const fn offset(&self) -> ScreenPoint {
        ScreenPoint::new(self.offset_x, self.offset_y)
    }

    #[must_use]
    pub const fn viewport(&self) -> ScreenSize {
        self.viewport
    }

    #[must_use]
    pub const fn world(&self) -> WorldSize {
        self.world
    }

    /// Configured `(min_zoom, max_zoom)` before viewport fitting.
    #[must_use]
    pub const fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Lowest scale the camera accepts for the current viewport.
    #[must_use]
    pub fn effective_min_zoom(&self) -> f64 {
        let fit_x = self.viewport.width / f64::from(self.world.width);
        let fit_y = self.viewport.height / f64::from(self.world.height);
        self.min_zoom.max(fit_x).max(fit_y)
    }

    /// Highest scale the camera accepts. Never below the effective minimum.
    #[must_use]
    pub fn effective_max_zoom(&self) -> f64 {
        self.max_zoom.max(self.effective_min_zoom())
    }

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn screen_to_world(&self, point: ScreenPoint) -> WorldPos {
        WorldPos::new(
            (point.x - self.offset_x) / self.scale,
            (point.y - self.offset_y) / self.scale,
        )
    }

    #[must_use]
    pub fn world_to_screen(&self, point: WorldPos) -> ScreenPoint {
        ScreenPoint::new(
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }

    /// Convert a screen-space displacement to world units.
    #[must_use]
    pub fn screen_delta_to_world(&self, dx: f64, dy: f64) -> WorldDelta {
        WorldDelta::new(dx / self.scale, dy / self.scale)
    }

    #[must_use]
    pub fn world_rect_to_screen(&self, rect: ZoneRect) -> ScreenRect {
        let origin = self.world_to_screen(WorldPos::from(rect.position()));
        ScreenRect::new(
            origin.x,
            origin.y,
            f64::from(rect.width) * self.scale,
            f64::from(rect.height) * self.scale,
        )
    }

    /// World-space corners `(top_left, bottom_right)` of the visible area.
    #[must_use]
    pub fn visible_world_rect(&self) -> (WorldPos, WorldPos) {
        (
            self.screen_to_world(ScreenPoint::new(0.0, 0.0)),
            self.screen_to_world(ScreenPoint::new(self.viewport.width, self.viewport.height)),
        )
    }

    // -----------------------------------------------------------------------
    // Mutations. Each returns whether the camera changed.
    // -----------------------------------------------------------------------

    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        let before = self.offset();
        self.offset_x += dx;
        self.offset_y += dy;
        self.clamp_offset();
        self.offset() != before
    }

    /// Set the scale, keeping the world point at the viewport center fixed.
    pub fn set_zoom(&mut self, scale: f64) -> bool {
        self.zoom_to(scale, self.viewport.center())
    }

    /// Multiply the scale by `factor`, keeping the world point under `pivot`
    /// fixed.
    pub fn zoom_at(&mut self, factor: f64, pivot: ScreenPoint) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.zoom_to(self.scale * factor, pivot)
    }

    /// Scale to the effective minimum, showing as much of the world as fits.
    pub fn zoom_to_fit(&mut self) -> bool {
        let fit = self.effective_min_zoom();
        self.set_zoom(fit)
    }

    /// Resize the viewport, re-deriving the zoom bounds and the offset.
    pub fn set_viewport(&mut self, viewport: ScreenSize) -> bool {
        let valid = viewport.width.is_finite()
            && viewport.height.is_finite()
            && viewport.width > 0.0
            && viewport.height > 0.0;
        if !valid {
            tracing::trace!(target: LOG_TARGET, ?viewport, "invalid viewport ignored");
            return false;
        }
        let before = self.clone();
        self.viewport = viewport;
        self.scale = self.clamp_scale(self.scale);
        self.clamp_offset();
        *self != before
    }

    fn zoom_to(&mut self, scale: f64, pivot: ScreenPoint) -> bool {
        if !scale.is_finite() || !pivot.is_finite() {
            return false;
        }
        let next = self.clamp_scale(scale);
        let anchor = self.screen_to_world(pivot);
        let before = (self.scale, self.offset());
        self.scale = next;
        self.offset_x = pivot.x - anchor.x * next;
        self.offset_y = pivot.y - anchor.y * next;
        self.clamp_offset();
        let changed = (self.scale, self.offset()) != before;
        if changed {
            tracing::debug!(target: LOG_TARGET, scale = self.scale, "zoom changed");
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify the viewport, zoom bounds, scale range and offset clamping.
    ///
    /// Every mutation keeps these; the check exists for state that arrives
    /// from outside, such as a decoded snapshot.
    pub fn check_invariants(&self) -> Result<(), CameraError> {
        let viewport = self.viewport;
        if !(viewport.width.is_finite()
            && viewport.height.is_finite()
            && viewport.width > 0.0
            && viewport.height > 0.0)
        {
            return Err(CameraError::InvalidViewport { viewport });
        }
        if self.world.width <= 0 || self.world.height <= 0 {
            return Err(CameraError::EmptyWorld { world: self.world });
        }
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite())
            || self.min_zoom <= 0.0
            || self.max_zoom < self.min_zoom
        {
            return Err(CameraError::InvalidZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }

        let (min, max) = (self.effective_min_zoom(), self.effective_max_zoom());
        let slack = TOLERANCE * max;
        if !self.scale.is_finite() || self.scale < min - slack || self.scale > max + slack {
            return Err(CameraError::ScaleOutOfRange {
                scale: self.scale,
                min,
                max,
            });
        }

        let mut expected = self.clone();
        expected.clamp_offset();
        let offset = self.offset();
        let clamped = expected.offset();
        let near = |a: f64, b: f64| (a - b).abs() <= TOLERANCE * (1.0 + b.abs());
        if !(offset.is_finite() && near(offset.x, clamped.x) && near(offset.y, clamped.y)) {
            return Err(CameraError::OffsetNotClamped {
                offset,
                expected: clamped,
            });
        }
        Ok(())
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.effective_min_zoom(), self.effective_max_zoom())
    }

    fn clamp_offset(&mut self) {
        self.offset_x = clamp_axis(
            self.offset_x,
            self.viewport.width,
            f64::from(self.world.width) * self.scale,
        );
        self.offset_y = clamp_axis(
            self.offset_y,
            self.viewport.height,
            f64::from(self.world.height) * self.scale,
        );
    }
}

fn clamp_axis(offset: f64, viewport: f64, scaled: f64) -> f64 {
    if scaled >= viewport {
        offset.clamp(viewport - scaled, 0.0)
    } else {
        (viewport - scaled) / 2.0
    }
}

/// Camera state that no sequence of camera operations can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraError {
    InvalidViewport { viewport: ScreenSize },
    EmptyWorld { world: WorldSize },
    InvalidZoomBounds { min: f64, max: f64 },
    /// Scale outside `[effective_min, effective_max]`.
    ScaleOutOfRange { scale: f64, min: f64, max: f64 },
    /// Offset would show area outside the world (or miss centering).
    OffsetNotClamped {
        offset: ScreenPoint,
        expected: ScreenPoint,
    },
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { viewport } => write!(
                f,
                "viewport {}x{} must be finite and positive",
                viewport.width, viewport.height
            ),
            Self::EmptyWorld { world } => {
                write!(f, "camera world {}x{} is empty", world.width, world.height)
            }
            Self::InvalidZoomBounds { min, max } => {
                write!(f, "zoom bounds [{min}, {max}] are invalid")
            }
            Self::ScaleOutOfRange { scale, min, max } => {
                write!(f, "scale {scale} outside [{min}, {max}]")
            }
            Self::OffsetNotClamped { offset, expected } => write!(
                f,
                "offset ({}, {}) is not clamped (expected ({}, {}))",
                offset.x, offset.y, expected.x, expected.y
            ),
        }
    }
}

impl std::error::Error for CameraError {}
