#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! # Defaults
//!
//! | Setting | Default | Range | Description |
//! |---------|---------|-------|-------------|
//! | `world` | 1200x800 | multiples of pitch | Canvas size in world units |
//! | `grid_pitch` | 20 | 1-512 | Snapping unit |
//! | `min_zone_cells` | 1 | >= 1 | Minimum zone side, in cells |
//! | `default_zone_cells` | 2 | >= `min_zone_cells` | Side of newly created zones |
//! | `min_zoom` / `max_zoom` | 0.25 / 4.0 | 0.01-64 | Camera scale bounds |
//! | `viewport` | 800x600 | >= 1 | Visible area in screen pixels |
//! | `tap_slop` | 4px | 0-64 | Travel under which a gesture is a tap |
//! | `handle_radius` | 8px | 1-64 | Hit radius of corner handles |
//! | `reservation_grace_minutes` | 5 | 0-1440 | How far in the past a booking may start |
//!
//! # Environment Variables
//!
//! | Variable | Type | Description |
//! |----------|------|-------------|
//! | `PLACEGRID_WORLD_WIDTH` | i32 | World width |
//! | `PLACEGRID_WORLD_HEIGHT` | i32 | World height |
//! | `PLACEGRID_GRID_PITCH` | i32 | Grid pitch |
//! | `PLACEGRID_MIN_ZOOM` | f64 | Lower zoom bound |
//! | `PLACEGRID_MAX_ZOOM` | f64 | Upper zoom bound |
//! | `PLACEGRID_TAP_SLOP_PX` | f64 | Tap slop |
//! | `PLACEGRID_RESERVATION_GRACE_MIN` | i64 | Past-start grace window |
//! | `PLACEGRID_PLACE_NAME` | string | Default label for new zones |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{GridPitch, ScreenSize, WorldSize};

pub const DEFAULT_WORLD_WIDTH: i32 = 1200;
pub const DEFAULT_WORLD_HEIGHT: i32 = 800;
pub const DEFAULT_GRID_PITCH: i32 = 20;
pub const DEFAULT_MIN_ZONE_CELLS: i32 = 1;
pub const DEFAULT_ZONE_CELLS: i32 = 2;
pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
pub const DEFAULT_MAX_ZOOM: f64 = 4.0;
pub const DEFAULT_TAP_SLOP_PX: f64 = 4.0;
pub const DEFAULT_HANDLE_RADIUS_PX: f64 = 8.0;
pub const DEFAULT_RESERVATION_GRACE_MINUTES: i64 = 5;
pub const DEFAULT_PLACE_NAME: &str = "Place";

/// Maximum zone label length, in characters.
pub const MAX_LABEL_CHARS: usize = 256;

const MAX_GRID_PITCH: i32 = 512;
const MIN_ZOOM_FLOOR: f64 = 0.01;
const MAX_ZOOM_CEILING: f64 = 64.0;
const MAX_TAP_SLOP_PX: f64 = 64.0;
const MIN_HANDLE_RADIUS_PX: f64 = 1.0;
const MAX_HANDLE_RADIUS_PX: f64 = 64.0;
const MAX_GRACE_MINUTES: i64 = 24 * 60;

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub world: WorldSize,
    pub grid_pitch: i32,
    pub min_zone_cells: i32,
    pub default_zone_cells: i32,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub viewport: ScreenSize,
    pub tap_slop: f64,
    pub handle_radius: f64,
    pub reservation_grace_minutes: i64,
    /// Display label given to new zones by the hosting page.
    pub place_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            world: WorldSize::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT),
            grid_pitch: DEFAULT_GRID_PITCH,
            min_zone_cells: DEFAULT_MIN_ZONE_CELLS,
            default_zone_cells: DEFAULT_ZONE_CELLS,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            viewport: ScreenSize::new(800.0, 600.0),
            tap_slop: DEFAULT_TAP_SLOP_PX,
            handle_radius: DEFAULT_HANDLE_RADIUS_PX,
            reservation_grace_minutes: DEFAULT_RESERVATION_GRACE_MINUTES,
            place_name: DEFAULT_PLACE_NAME.to_string(),
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn with_world(mut self, width: i32, height: i32) -> Self {
        self.world = WorldSize::new(width, height);
        self
    }

    #[must_use]
    pub fn with_grid_pitch(mut self, pitch: i32) -> Self {
        self.grid_pitch = pitch;
        self
    }

    #[must_use]
    pub fn with_zone_cells(mut self, min_cells: i32, default_cells: i32) -> Self {
        self.min_zone_cells = min_cells;
        self.default_zone_cells = default_cells;
        self
    }

    #[must_use]
    pub fn with_zoom_bounds(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = ScreenSize::new(width, height);
        self
    }

    #[must_use]
    pub fn with_tap_slop(mut self, tap_slop: f64) -> Self {
        self.tap_slop = tap_slop;
        self
    }

    #[must_use]
    pub fn with_reservation_grace_minutes(mut self, minutes: i64) -> Self {
        self.reservation_grace_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_place_name(mut self, name: impl Into<String>) -> Self {
        self.place_name = name.into();
        self
    }

    /// Load config from `PLACEGRID_*` environment variables on top of the
    /// defaults. Values are clamped to valid ranges.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = parse_var::<i32>(&lookup, "PLACEGRID_WORLD_WIDTH") {
            config.world.width = value;
        }
        if let Some(value) = parse_var::<i32>(&lookup, "PLACEGRID_WORLD_HEIGHT") {
            config.world.height = value;
        }
        if let Some(value) = parse_var::<i32>(&lookup, "PLACEGRID_GRID_PITCH") {
            config.grid_pitch = value;
        }
        if let Some(value) = parse_var::<f64>(&lookup, "PLACEGRID_MIN_ZOOM") {
            config.min_zoom = value;
        }
        if let Some(value) = parse_var::<f64>(&lookup, "PLACEGRID_MAX_ZOOM") {
            config.max_zoom = value;
        }
        if let Some(value) = parse_var::<f64>(&lookup, "PLACEGRID_TAP_SLOP_PX") {
            config.tap_slop = value;
        }
        if let Some(value) = parse_var::<i64>(&lookup, "PLACEGRID_RESERVATION_GRACE_MIN") {
            config.reservation_grace_minutes = value;
        }
        if let Some(name) = lookup("PLACEGRID_PLACE_NAME")
            && !name.trim().is_empty()
        {
            config.place_name = name;
        }

        config.validated()
    }

    /// Clamp every value into its safe range.
    ///
    /// - pitch clamped to 1-512
    /// - zone cells >= 1 and `default_zone_cells >= min_zone_cells`
    /// - world dimensions rounded up to a multiple of the pitch and at least
    ///   one default zone wide/high
    /// - zoom bounds finite, ordered, within 0.01-64
    /// - viewport at least 1x1
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.grid_pitch = self.grid_pitch.clamp(1, MAX_GRID_PITCH);
        self.min_zone_cells = self.min_zone_cells.max(1);
        self.default_zone_cells = self.default_zone_cells.max(self.min_zone_cells);

        let pitch = self.pitch();
        let default_side = pitch.cells(self.default_zone_cells);
        self.world.width = pitch.ceil(self.world.width.max(default_side));
        self.world.height = pitch.ceil(self.world.height.max(default_side));

        self.min_zoom =
            finite_or(self.min_zoom, DEFAULT_MIN_ZOOM).clamp(MIN_ZOOM_FLOOR, MAX_ZOOM_CEILING);
        self.max_zoom = finite_or(self.max_zoom, DEFAULT_MAX_ZOOM)
            .clamp(MIN_ZOOM_FLOOR, MAX_ZOOM_CEILING)
            .max(self.min_zoom);

        self.viewport.width = finite_or(self.viewport.width, 1.0).max(1.0);
        self.viewport.height = finite_or(self.viewport.height, 1.0).max(1.0);
        self.tap_slop = finite_or(self.tap_slop, DEFAULT_TAP_SLOP_PX).clamp(0.0, MAX_TAP_SLOP_PX);
        self.handle_radius = finite_or(self.handle_radius, DEFAULT_HANDLE_RADIUS_PX)
            .clamp(MIN_HANDLE_RADIUS_PX, MAX_HANDLE_RADIUS_PX);
        self.reservation_grace_minutes = self.reservation_grace_minutes.clamp(0, MAX_GRACE_MINUTES);
        self
    }

    /// Check the configuration without repairing it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pitch = GridPitch::new(self.grid_pitch).map_err(|_| ConfigError::InvalidPitch {
            pitch: self.grid_pitch,
        })?;
        if self.min_zone_cells < 1 || self.default_zone_cells < self.min_zone_cells {
            return Err(ConfigError::InvalidZoneCells {
                min: self.min_zone_cells,
                default: self.default_zone_cells,
            });
        }
        if self.world.width % pitch.get() != 0 || self.world.height % pitch.get() != 0 {
            return Err(ConfigError::WorldOffGrid {
                world: self.world,
                pitch: self.grid_pitch,
            });
        }
        let default_side = pitch.cells(self.default_zone_cells);
        if self.world.width < default_side || self.world.height < default_side {
            return Err(ConfigError::WorldTooSmall {
                world: self.world,
                zone_side: default_side,
            });
        }
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite())
            || self.min_zoom <= 0.0
            || self.max_zoom < self.min_zoom
        {
            return Err(ConfigError::InvalidZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.viewport.width.is_finite() && self.viewport.height.is_finite())
            || self.viewport.width <= 0.0
            || self.viewport.height <= 0.0
        {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.tap_slop.is_finite() || self.tap_slop < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                field: "tap_slop",
                value: self.tap_slop,
            });
        }
        if !self.handle_radius.is_finite() || self.handle_radius <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                field: "handle_radius",
                value: self.handle_radius,
            });
        }
        if self.reservation_grace_minutes < 0 {
            return Err(ConfigError::NegativeGrace {
                minutes: self.reservation_grace_minutes,
            });
        }
        Ok(())
    }

    /// Grid pitch as a checked value. A non-positive raw pitch reads as 1;
    /// call [`validate`](Self::validate) first to reject those.
    #[must_use]
    pub const fn pitch(&self) -> GridPitch {
        GridPitch::clamped(self.grid_pitch)
    }

    /// Minimum zone side in world units.
    #[must_use]
    pub fn min_zone_size(&self) -> i32 {
        self.pitch().cells(self.min_zone_cells)
    }

    /// Side of a newly created zone in world units.
    #[must_use]
    pub fn default_zone_size(&self) -> i32 {
        self.pitch().cells(self.default_zone_cells)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(target: "placegrid.config", key, value = %raw, "ignoring unparsable value");
            None
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Structural configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidPitch { pitch: i32 },
    InvalidZoneCells { min: i32, default: i32 },
    WorldOffGrid { world: WorldSize, pitch: i32 },
    WorldTooSmall { world: WorldSize, zone_side: i32 },
    InvalidZoomBounds { min: f64, max: f64 },
    InvalidViewport { width: f64, height: f64 },
    InvalidThreshold { field: &'static str, value: f64 },
    NegativeGrace { minutes: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPitch { pitch } => write!(f, "grid pitch must be > 0 (got {pitch})"),
            Self::InvalidZoneCells { min, default } => write!(
                f,
                "zone cells must satisfy 1 <= min <= default (got min={min} default={default})"
            ),
            Self::WorldOffGrid { world, pitch } => write!(
                f,
                "world {}x{} is not a multiple of grid pitch {pitch}",
                world.width, world.height
            ),
            Self::WorldTooSmall { world, zone_side } => write!(
                f,
                "world {}x{} cannot hold a default zone of side {zone_side}",
                world.width, world.height
            ),
            Self::InvalidZoomBounds { min, max } => {
                write!(f, "invalid zoom bounds min={min} max={max}")
            }
            Self::InvalidViewport { width, height } => {
                write!(f, "viewport must be positive and finite (got {width}x{height})")
            }
            Self::InvalidThreshold { field, value } => {
                write!(f, "invalid {field} value {value}")
            }
            Self::NegativeGrace { minutes } => {
                write!(f, "reservation grace must be >= 0 minutes (got {minutes})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
