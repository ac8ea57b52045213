#![forbid(unsafe_code)]

//! World model, placement policy, camera and gesture machine.
//!
//! The flow for one pointer event is
//! `InteractionController::apply` -> hit test -> `World` mutation (snap,
//! clamp, collision check) or `Camera` pan. Nothing here allocates threads
//! or performs I/O; callers own all state and drive it in event order.

pub mod camera;
pub mod hit;
pub mod interaction;
pub mod world;

pub use camera::{Camera, CameraError};
pub use hit::{HitTarget, hit_test};
pub use interaction::{
    GestureEffect, GestureKind, GestureNoopReason, GestureState, GestureTransition,
    InteractionController, InteractionError,
};
pub use world::{
    Creation, IgnoreReason, LABEL_PLACEHOLDER, Placement, RejectReason, World, WorldError, Zone,
    ZoneColor,
};
