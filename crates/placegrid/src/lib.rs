#![forbid(unsafe_code)]

//! placegrid public facade.
//!
//! An [`EditorState`] owns the zone world, the camera, the gesture machine
//! and the reservation ledger. Hosts feed it [`EditorEvent`]s, read back an
//! [`EditorView`] per frame and persist it as an [`EditorSnapshot`].
//!
//! ```
//! use placegrid::prelude::*;
//!
//! let mut editor = EditorState::new(EditorConfig::default())?;
//! editor.apply(&EditorEvent::Open)?;
//! editor.apply(&EditorEvent::AddZone { at: None })?;
//! assert_eq!(EditorView::from_state(&editor).zones.len(), 1);
//! # Ok::<(), placegrid::Error>(())
//! ```

use std::fmt;

pub mod editor;
pub mod snapshot;
pub mod view;

// --- Facade re-exports ----------------------------------------------------

pub use editor::{
    EditorEffect, EditorEvent, EditorNoopReason, EditorState, EditorTransition, apply_event,
};
pub use snapshot::{EDITOR_SCHEMA_VERSION, EditorSnapshot, SnapshotError};
pub use view::{EditorView, HandleView, ZoneView};

// --- Component re-exports -------------------------------------------------

pub use placegrid_booking::{
    LedgerError, Reservation, ReservationRejection, ReservationRequest, StoreError,
};
pub use placegrid_core::{
    ConfigError, Corner, EditorConfig, PointerEvent, PointerEventError, ScreenPoint, ScreenSize,
    WorldDelta, WorldPos, ZoneId, ZoneRect,
};
pub use placegrid_layout::{
    CameraError, Creation, GestureEffect, IgnoreReason, InteractionError, Placement, RejectReason,
    WorldError, ZoneColor,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for placegrid hosts.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The editor configuration is structurally impossible.
    Config(ConfigError),
    /// A pointer event or gesture threshold was malformed.
    Interaction(InteractionError),
    /// The reservation store failed. Validation rejections surface as
    /// effects instead.
    Ledger(LedgerError),
    Snapshot(SnapshotError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Interaction(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Interaction(err) => Some(err),
            Self::Ledger(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<InteractionError> for Error {
    fn from(err: InteractionError) -> Self {
        Self::Interaction(err)
    }
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

/// Standard result type for placegrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Corner, EditorConfig, EditorEffect, EditorEvent, EditorSnapshot, EditorState, EditorView,
        Error, PointerEvent, ReservationRequest, Result, ScreenPoint, WorldDelta, WorldPos, ZoneId,
        apply_event,
    };

    pub use crate::{booking, core, layout};
}

pub use placegrid_booking as booking;
pub use placegrid_core as core;
pub use placegrid_layout as layout;
