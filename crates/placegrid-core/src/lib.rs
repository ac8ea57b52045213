#![forbid(unsafe_code)]

//! Core: geometry, identifiers, pointer events and configuration.
//!
//! # Role in placegrid
//! `placegrid-core` holds the value types every other crate speaks in. It has
//! no editor state of its own: the world model, camera and gesture machine
//! live in `placegrid-layout`, the reservation ledger in `placegrid-booking`.
//!
//! # Primary responsibilities
//! - **Geometry**: world/screen points, [`ZoneRect`] with open-interval
//!   overlap, corner handles, grid snapping via [`GridPitch`].
//! - **Identifiers**: non-zero [`ZoneId`] values and their allocator.
//! - **Events**: raw [`PointerEvent`]s as dispatched by the host UI.
//! - **Configuration**: [`EditorConfig`] defaults, env overrides and checks.

pub mod config;
pub mod event;
pub mod geometry;
pub mod id;

pub use config::{ConfigError, EditorConfig, MAX_LABEL_CHARS};
pub use event::{PointerEvent, PointerEventError};
pub use geometry::{
    Corner, GeometryError, GridPitch, ScreenPoint, ScreenRect, ScreenSize, WorldDelta, WorldPoint,
    WorldPos, WorldSize, ZoneRect,
};
pub use id::{ZoneId, ZoneIdAllocator, ZoneIdError};
