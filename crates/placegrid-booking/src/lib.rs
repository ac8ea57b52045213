#![forbid(unsafe_code)]

//! Per-zone reservation ledger.
//!
//! Reservations are keyed by zone id and validated before they reach a
//! [`ReservationStore`]: all fields present, start not in the past beyond a
//! grace window, end after start, and no half-open overlap with another
//! booking on the same zone and date. Rejections carry a user-facing
//! message through `Display`.

pub mod ledger;
pub mod reservation;
pub mod store;

pub use ledger::{LedgerError, ReservationLedger};
pub use reservation::{
    RequestField, Reservation, ReservationRejection, ReservationRequest, UNTITLED_RESERVATION,
    validate_request,
};
pub use store::{MemoryReservationStore, ReservationStore, StoreError};
