#![forbid(unsafe_code)]

//! Pointer events dispatched from the hosting UI layer.
//!
//! Positions are in screen pixels relative to the editor viewport. Every
//! pointer carries a non-zero device id so a gesture can capture it; moves and
//! ups from other pointers are ignored while a gesture is active.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::ScreenPoint;

/// One raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        pointer_id: u32,
        position: ScreenPoint,
    },
    Move {
        pointer_id: u32,
        position: ScreenPoint,
    },
    Up {
        pointer_id: u32,
        position: ScreenPoint,
    },
    /// The host lost track of the pointer. Ends the gesture like `Up`.
    Cancel { pointer_id: u32 },
}

impl PointerEvent {
    #[must_use]
    pub const fn down(pointer_id: u32, x: f64, y: f64) -> Self {
        Self::Down {
            pointer_id,
            position: ScreenPoint::new(x, y),
        }
    }

    #[must_use]
    pub const fn moved(pointer_id: u32, x: f64, y: f64) -> Self {
        Self::Move {
            pointer_id,
            position: ScreenPoint::new(x, y),
        }
    }

    #[must_use]
    pub const fn up(pointer_id: u32, x: f64, y: f64) -> Self {
        Self::Up {
            pointer_id,
            position: ScreenPoint::new(x, y),
        }
    }

    #[must_use]
    pub const fn cancel(pointer_id: u32) -> Self {
        Self::Cancel { pointer_id }
    }

    #[must_use]
    pub const fn pointer_id(&self) -> u32 {
        match *self {
            Self::Down { pointer_id, .. }
            | Self::Move { pointer_id, .. }
            | Self::Up { pointer_id, .. }
            | Self::Cancel { pointer_id } => pointer_id,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Option<ScreenPoint> {
        match *self {
            Self::Down { position, .. }
            | Self::Move { position, .. }
            | Self::Up { position, .. } => Some(position),
            Self::Cancel { .. } => None,
        }
    }

    /// Reject events that cannot be routed deterministically.
    pub fn validate(&self) -> Result<(), PointerEventError> {
        if self.pointer_id() == 0 {
            return Err(PointerEventError::ZeroPointerId);
        }
        if let Some(position) = self.position()
            && !position.is_finite()
        {
            return Err(PointerEventError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        Ok(())
    }
}

/// Validation failures for pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEventError {
    ZeroPointerId,
    NonFinitePosition { x: f64, y: f64 },
}

impl fmt::Display for PointerEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPointerId => write!(f, "pointer events require a non-zero pointer_id"),
            Self::NonFinitePosition { x, y } => {
                write!(f, "pointer position must be finite (got {x}, {y})")
            }
        }
    }
}

impl std::error::Error for PointerEventError {}
