#![forbid(unsafe_code)]

//! Versioned JSON snapshots of the editor state.
//!
//! A snapshot is untrusted input on the way back in: [`EditorSnapshot::validate`]
//! re-checks every placement invariant and the consistency between the config,
//! world, camera and ledger before [`EditorSnapshot::restore`] hands out a
//! live [`EditorState`].

use std::collections::BTreeMap;
use std::fmt;

use placegrid_booking::StoreError;
use placegrid_core::{ConfigError, ZoneId};
use placegrid_layout::{CameraError, WorldError};
use serde::{Deserialize, Serialize};

use crate::editor::EditorState;

/// Current snapshot schema version.
pub const EDITOR_SCHEMA_VERSION: u16 = 1;

/// Persisted editor state with version metadata.
///
/// Unknown keys in `extensions` survive a round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub state: EditorState,
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

fn default_schema_version() -> u16 {
    EDITOR_SCHEMA_VERSION
}

impl EditorSnapshot {
    #[must_use]
    pub fn capture(state: &EditorState) -> Self {
        Self {
            schema_version: EDITOR_SCHEMA_VERSION,
            state: state.clone(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|err| SnapshotError::Encode {
            reason: err.to_string(),
        })
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json).map_err(|err| SnapshotError::Decode {
            reason: err.to_string(),
        })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check schema version, config, placement invariants, camera clamping,
    /// gesture thresholds and reservation invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema_version != EDITOR_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.schema_version,
                expected: EDITOR_SCHEMA_VERSION,
            });
        }

        let state = &self.state;
        let config = state.config();
        config.validate()?;

        let world = state.world();
        if world.size() != config.world || state.camera().world() != config.world {
            return Err(SnapshotError::ConfigMismatch { field: "world" });
        }
        if world.pitch() != config.pitch() {
            return Err(SnapshotError::ConfigMismatch {
                field: "grid_pitch",
            });
        }
        if world.min_zone_side() != config.min_zone_size()
            || world.default_zone_side() != config.default_zone_size()
        {
            return Err(SnapshotError::ConfigMismatch {
                field: "zone_cells",
            });
        }
        if state.camera().zoom_bounds() != (config.min_zoom, config.max_zoom) {
            return Err(SnapshotError::ConfigMismatch {
                field: "zoom_bounds",
            });
        }
        if state.interaction().tap_slop() != config.tap_slop {
            return Err(SnapshotError::ConfigMismatch { field: "tap_slop" });
        }
        if state.interaction().handle_radius() != config.handle_radius {
            return Err(SnapshotError::ConfigMismatch {
                field: "handle_radius",
            });
        }
        if state.ledger().grace_minutes() != config.reservation_grace_minutes {
            return Err(SnapshotError::ConfigMismatch {
                field: "reservation_grace_minutes",
            });
        }
        world.check_invariants()?;
        // The viewport may differ from the config after a resize; the
        // camera only has to be internally consistent.
        state.camera().check_invariants()?;

        let store = state.ledger().store();
        store.check_invariants()?;
        if let Some(zone) = store.zones().find(|zone| world.zone(*zone).is_none()) {
            return Err(SnapshotError::OrphanedReservations { zone });
        }
        Ok(())
    }

    /// Validate and unwrap into a live editor.
    pub fn restore(self) -> Result<EditorState, SnapshotError> {
        self.validate()?;
        tracing::debug!(
            target: "placegrid.editor",
            zones = self.state.world().len(),
            "snapshot restored"
        );
        Ok(self.state)
    }
}

/// Snapshot encoding and validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    UnsupportedVersion { found: u16, expected: u16 },
    Encode { reason: String },
    Decode { reason: String },
    Config(ConfigError),
    /// A component disagrees with the stored config.
    ConfigMismatch { field: &'static str },
    World(WorldError),
    Camera(CameraError),
    /// Reservation lists are misfiled, unsorted, inverted or overlapping.
    Ledger(StoreError),
    /// Reservations reference a zone that is not live.
    OrphanedReservations { zone: ZoneId },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => write!(
                f,
                "unsupported editor schema version {found} (expected {expected})"
            ),
            Self::Encode { reason } => write!(f, "snapshot encoding failed: {reason}"),
            Self::Decode { reason } => write!(f, "snapshot decoding failed: {reason}"),
            Self::Config(err) => write!(f, "snapshot config invalid: {err}"),
            Self::ConfigMismatch { field } => {
                write!(f, "snapshot state disagrees with config on {field}")
            }
            Self::World(err) => write!(f, "snapshot world invalid: {err}"),
            Self::Camera(err) => write!(f, "snapshot camera invalid: {err}"),
            Self::Ledger(err) => write!(f, "snapshot reservations invalid: {err}"),
            Self::OrphanedReservations { zone } => {
                write!(f, "snapshot holds reservations for missing {zone}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::World(err) => Some(err),
            Self::Camera(err) => Some(err),
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SnapshotError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<WorldError> for SnapshotError {
    fn from(err: WorldError) -> Self {
        Self::World(err)
    }
}

impl From<CameraError> for SnapshotError {
    fn from(err: CameraError) -> Self {
        Self::Camera(err)
    }
}

impl From<StoreError> for SnapshotError {
    fn from(err: StoreError) -> Self {
        Self::Ledger(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorEvent;
    use placegrid_core::{EditorConfig, WorldPos};

    fn populated() -> EditorState {
        let mut state = EditorState::new(EditorConfig::default()).expect("default config");
        state.apply(&EditorEvent::Open).expect("open");
        for (x, y) in [(0.0, 0.0), (200.0, 100.0)] {
            state
                .apply(&EditorEvent::AddZone {
                    at: Some(WorldPos::new(x, y)),
                })
                .expect("add");
        }
        state
    }

    #[test]
    fn json_round_trip_preserves_state() {
        let state = populated();
        let json = EditorSnapshot::capture(&state).to_json().expect("encode");
        let restored = EditorSnapshot::from_json(&json)
            .and_then(EditorSnapshot::restore)
            .expect("decode");
        assert_eq!(restored, state);
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let state = populated();
        let mut value = serde_json::to_value(EditorSnapshot::capture(&state)).expect("to value");
        if let Some(object) = value.as_object_mut() {
            object.remove("schema_version");
        }
        let snapshot = EditorSnapshot::from_json(&value.to_string()).expect("decode");
        assert_eq!(snapshot.schema_version, EDITOR_SCHEMA_VERSION);
    }

    #[test]
    fn future_version_is_rejected() {
        let mut snapshot = EditorSnapshot::capture(&populated());
        snapshot.schema_version = 2;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            EditorSnapshot::from_json("{\"state\": 5}"),
            Err(SnapshotError::Decode { .. })
        ));
    }
}
