#![forbid(unsafe_code)]

//! Reservation persistence seam.
//!
//! The ledger validates, the store keeps. A backend only has to hold each
//! zone's reservations sorted by `(date, start)`; overlap and past-time rules
//! never reach it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use placegrid_core::ZoneId;
use serde::{Deserialize, Serialize};

use crate::reservation::Reservation;

/// Pluggable reservation storage.
pub trait ReservationStore {
    /// Insert a validated reservation, returning its index in the zone's
    /// sorted list.
    fn create(&mut self, reservation: Reservation) -> Result<usize, StoreError>;

    /// All reservations of `zone`, sorted by `(date, start)`.
    fn list(&self, zone: ZoneId) -> Result<Vec<Reservation>, StoreError>;

    /// Remove the reservation at `index` in the zone's sorted list. Out of
    /// range is `Ok(None)`.
    fn delete(&mut self, zone: ZoneId, index: usize) -> Result<Option<Reservation>, StoreError>;

    /// Remove every reservation of `zone`, returning how many were dropped.
    fn purge_zone(&mut self, zone: ZoneId) -> Result<usize, StoreError>;

    /// Reservations of `zone` on one date, in start order.
    fn list_on(&self, zone: ZoneId, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        let mut all = self.list(zone)?;
        all.retain(|r| r.date == date);
        Ok(all)
    }
}

/// In-process store. Lists stay sorted on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReservationStore {
    zones: BTreeMap<ZoneId, Vec<Reservation>>,
}

impl MemoryReservationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zones that currently hold at least one reservation.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.keys().copied()
    }

    /// Borrowing view of one zone's list.
    #[must_use]
    pub fn get(&self, zone: ZoneId) -> &[Reservation] {
        self.zones.get(&zone).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }

    /// Verify every list: non-empty, filed under its own zone, each entry
    /// ending after it starts, sorted by `(date, start)`, and free of
    /// overlaps within a date.
    pub fn check_invariants(&self) -> Result<(), StoreError> {
        for (&zone, list) in &self.zones {
            let corrupt = |message: String| StoreError::Corrupt { zone, message };
            if list.is_empty() {
                return Err(corrupt("empty reservation list".to_string()));
            }
            for r in list {
                if r.zone != zone {
                    return Err(corrupt(format!("holds a reservation for {}", r.zone)));
                }
                if r.end <= r.start {
                    return Err(corrupt(format!(
                        "{} {}-{} does not end after it starts",
                        r.date, r.start, r.end
                    )));
                }
            }
            for pair in list.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                if a.sort_key() > b.sort_key() {
                    return Err(corrupt(format!(
                        "{} {} listed before {} {}",
                        a.date, a.start, b.date, b.start
                    )));
                }
                // Sorted by start, so checking neighbors covers every pair.
                if a.overlaps(b.date, b.start, b.end) {
                    return Err(corrupt(format!(
                        "{} {}-{} overlaps {}-{}",
                        a.date, a.start, a.end, b.start, b.end
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.check_invariants().is_ok()
    }
}

impl ReservationStore for MemoryReservationStore {
    fn create(&mut self, reservation: Reservation) -> Result<usize, StoreError> {
        let list = self.zones.entry(reservation.zone).or_default();
        let key = reservation.sort_key();
        let index = list.partition_point(|r| r.sort_key() <= key);
        list.insert(index, reservation);
        Ok(index)
    }

    fn list(&self, zone: ZoneId) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.get(zone).to_vec())
    }

    fn delete(&mut self, zone: ZoneId, index: usize) -> Result<Option<Reservation>, StoreError> {
        let Some(list) = self.zones.get_mut(&zone) else {
            return Ok(None);
        };
        if index >= list.len() {
            return Ok(None);
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.zones.remove(&zone);
        }
        Ok(Some(removed))
    }

    fn purge_zone(&mut self, zone: ZoneId) -> Result<usize, StoreError> {
        Ok(self.zones.remove(&zone).map_or(0, |list| list.len()))
    }
}

/// Backend failure reported by a [`ReservationStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    Unavailable { message: String },
    /// The backend returned data that violates the store contract.
    Corrupt { zone: ZoneId, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { message } => write!(f, "reservation store unavailable: {message}"),
            Self::Corrupt { zone, message } => {
                write!(f, "reservation store corrupt for {zone}: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn zone(raw: u64) -> ZoneId {
        ZoneId::new(raw).expect("non-zero")
    }

    fn slot(zone_id: ZoneId, day: u32, hour: u32, title: &str) -> Reservation {
        Reservation {
            zone: zone_id,
            date: NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date"),
            start: NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(hour + 1, 0, 0).expect("valid time"),
            title: title.to_string(),
        }
    }

    #[test]
    fn create_keeps_lists_sorted() {
        let mut store = MemoryReservationStore::new();
        let z = zone(1);
        assert_eq!(store.create(slot(z, 2, 9, "b")), Ok(0));
        assert_eq!(store.create(slot(z, 1, 14, "a")), Ok(0));
        assert_eq!(store.create(slot(z, 2, 8, "c")), Ok(1));
        let titles: Vec<_> = store
            .list(z)
            .expect("memory store never fails")
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["a", "c", "b"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let mut store = MemoryReservationStore::new();
        let z = zone(1);
        store.create(slot(z, 1, 9, "only")).expect("insert");
        assert_eq!(store.delete(z, 3), Ok(None));
        assert_eq!(store.delete(zone(9), 0), Ok(None));
        assert_eq!(store.total(), 1);
        assert!(store.delete(z, 0).expect("memory store").is_some());
        assert_eq!(store.zones().count(), 0, "empty lists are dropped");
    }

    #[test]
    fn inverted_or_overlapping_entries_are_corrupt() {
        let z = zone(1);
        let mut inverted = slot(z, 1, 9, "backwards");
        inverted.end = NaiveTime::from_hms_opt(8, 30, 0).expect("valid time");
        let store = MemoryReservationStore {
            zones: BTreeMap::from([(z, vec![inverted])]),
        };
        assert!(matches!(
            store.check_invariants(),
            Err(StoreError::Corrupt { zone, .. }) if zone == z
        ));

        let mut long = slot(z, 1, 9, "long");
        long.end = NaiveTime::from_hms_opt(11, 0, 0).expect("valid time");
        let store = MemoryReservationStore {
            zones: BTreeMap::from([(z, vec![long, slot(z, 1, 10, "inside")])]),
        };
        assert!(!store.is_consistent());

        // Same hours on another day are fine.
        let store = MemoryReservationStore {
            zones: BTreeMap::from([(z, vec![slot(z, 1, 9, "a"), slot(z, 2, 9, "b")])]),
        };
        assert_eq!(store.check_invariants(), Ok(()));
    }

    #[test]
    fn purge_and_date_filter() {
        let mut store = MemoryReservationStore::new();
        let (a, b) = (zone(1), zone(2));
        store.create(slot(a, 1, 9, "a1")).expect("insert");
        store.create(slot(a, 2, 9, "a2")).expect("insert");
        store.create(slot(b, 1, 9, "b1")).expect("insert");
        let day_one = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        assert_eq!(store.list_on(a, day_one).map(|l| l.len()), Ok(1));
        assert_eq!(store.purge_zone(a), Ok(2));
        assert_eq!(store.purge_zone(a), Ok(0));
        assert_eq!(store.get(b).len(), 1);
    }
}
