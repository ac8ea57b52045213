#![forbid(unsafe_code)]

//! Validating front door over a [`ReservationStore`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use placegrid_core::{EditorConfig, ZoneId};
use serde::{Deserialize, Serialize};

use crate::reservation::{Reservation, ReservationRejection, ReservationRequest, validate_request};
use crate::store::{MemoryReservationStore, ReservationStore, StoreError};

const LOG_TARGET: &str = "placegrid.booking";

/// Per-zone reservation ledger.
///
/// Keyed by zone id only; it knows nothing about zone geometry. Whether a
/// zone's reservations outlive the zone is the caller's decision
/// (see [`purge_zone`](Self::purge_zone)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLedger<S = MemoryReservationStore> {
    store: S,
    grace_minutes: i64,
}

impl ReservationLedger<MemoryReservationStore> {
    /// Ledger over a fresh in-memory store.
    pub fn in_memory(grace_minutes: i64) -> Result<Self, LedgerError> {
        Self::new(MemoryReservationStore::new(), grace_minutes)
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self, LedgerError> {
        Self::in_memory(config.reservation_grace_minutes)
    }
}

impl<S: ReservationStore> ReservationLedger<S> {
    /// Wrap `store`. `grace_minutes` is how far before "now" a new booking
    /// may still start.
    pub fn new(store: S, grace_minutes: i64) -> Result<Self, LedgerError> {
        if grace_minutes < 0 || TimeDelta::try_minutes(grace_minutes).is_none() {
            return Err(LedgerError::InvalidGrace {
                minutes: grace_minutes,
            });
        }
        Ok(Self {
            store,
            grace_minutes,
        })
    }

    #[must_use]
    pub const fn grace_minutes(&self) -> i64 {
        self.grace_minutes
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate and insert a reservation.
    ///
    /// `now` is the caller's local wall-clock time. A rejection leaves the
    /// ledger unchanged.
    pub fn add_reservation(
        &mut self,
        zone: ZoneId,
        request: &ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<Reservation, LedgerError> {
        let grace = TimeDelta::try_minutes(self.grace_minutes).unwrap_or(TimeDelta::zero());
        let existing = match request.date {
            Some(date) => self.store.list_on(zone, date)?,
            None => Vec::new(),
        };
        let reservation = match validate_request(zone, request, &existing, now, grace) {
            Ok(reservation) => reservation,
            Err(rejection) => {
                tracing::debug!(target: LOG_TARGET, %zone, %rejection, "reservation rejected");
                return Err(LedgerError::Rejected(rejection));
            }
        };
        let index = self.store.create(reservation.clone())?;
        tracing::debug!(
            target: LOG_TARGET,
            %zone,
            date = %reservation.date,
            start = %reservation.start,
            end = %reservation.end,
            index,
            "reservation added"
        );
        Ok(reservation)
    }

    /// Remove by position in the zone's sorted list. Out of range is a no-op.
    pub fn delete_reservation(
        &mut self,
        zone: ZoneId,
        index: usize,
    ) -> Result<Option<Reservation>, LedgerError> {
        let removed = self.store.delete(zone, index)?;
        match &removed {
            Some(_) => tracing::debug!(target: LOG_TARGET, %zone, index, "reservation deleted"),
            None => tracing::trace!(target: LOG_TARGET, %zone, index, "delete index out of range"),
        }
        Ok(removed)
    }

    /// The zone's reservations sorted by `(date, start)`.
    pub fn list_reservations(&self, zone: ZoneId) -> Result<Vec<Reservation>, LedgerError> {
        Ok(self.store.list(zone)?)
    }

    pub fn reservations_on(
        &self,
        zone: ZoneId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, LedgerError> {
        Ok(self.store.list_on(zone, date)?)
    }

    /// Drop every reservation of a zone.
    pub fn purge_zone(&mut self, zone: ZoneId) -> Result<usize, LedgerError> {
        let purged = self.store.purge_zone(zone)?;
        if purged > 0 {
            tracing::debug!(target: LOG_TARGET, %zone, purged, "reservations purged");
        }
        Ok(purged)
    }
}

/// Ledger failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Validation refused the request; the message is user-facing.
    Rejected(ReservationRejection),
    Store(StoreError),
    InvalidGrace { minutes: i64 },
}

impl LedgerError {
    /// The validation rejection, if that is what this is.
    #[must_use]
    pub const fn rejection(&self) -> Option<&ReservationRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<ReservationRejection> for LedgerError {
    fn from(rejection: ReservationRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(rejection) => fmt::Display::fmt(rejection, f),
            Self::Store(error) => write!(f, "{error}"),
            Self::InvalidGrace { minutes } => {
                write!(f, "reservation grace must be a non-negative minute count (got {minutes})")
            }
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Store(error) => Some(error),
            Self::InvalidGrace { .. } => None,
        }
    }
}
