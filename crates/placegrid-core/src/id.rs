#![forbid(unsafe_code)]

//! Stable zone identifiers.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Identity of a placed zone. Survives moves, resizes and renames, and is
/// what reservations are filed under.
///
/// Numbering starts at one; a zero id never names a zone, including in
/// restored snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ZoneId(NonZeroU64);

impl ZoneId {
    /// Id of the first zone placed in a session.
    pub const MIN: Self = Self(NonZeroU64::MIN);

    pub fn new(raw: u64) -> Result<Self, ZoneIdError> {
        NonZeroU64::new(raw).map(Self).ok_or(ZoneIdError::Zero)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// The id a zone placed right after this one would get.
    pub fn checked_next(self) -> Result<Self, ZoneIdError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(ZoneIdError::Overflow { current: self })
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u64> for ZoneId {
    type Error = ZoneIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ZoneId> for u64 {
    fn from(id: ZoneId) -> Self {
        id.get()
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

/// Hands out zone ids in placement order. Deleting a zone does not free its
/// id, so a stale reservation can never attach to a newer zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneIdAllocator {
    next: ZoneId,
}

impl ZoneIdAllocator {
    /// Resume numbering, e.g. after restoring a layout.
    #[must_use]
    pub const fn with_next(next: ZoneId) -> Self {
        Self { next }
    }

    /// Id the next placed zone will receive.
    #[must_use]
    pub const fn peek(&self) -> ZoneId {
        self.next
    }

    /// Take the next id. Fails once the id space is used up, leaving the
    /// allocator unchanged.
    pub fn allocate(&mut self) -> Result<ZoneId, ZoneIdError> {
        let id = self.next;
        self.next = id.checked_next()?;
        Ok(id)
    }
}

impl Default for ZoneIdAllocator {
    fn default() -> Self {
        Self::with_next(ZoneId::MIN)
    }
}

/// Zone identifier errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneIdError {
    Zero,
    Overflow { current: ZoneId },
}

impl fmt::Display for ZoneIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zone id must be non-zero"),
            Self::Overflow { current } => {
                write!(f, "zone id allocator exhausted after {current}")
            }
        }
    }
}

impl std::error::Error for ZoneIdError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(ZoneId::new(0), Err(ZoneIdError::Zero));
        assert_eq!(ZoneId::new(7).map(ZoneId::get), Ok(7));
    }

    #[test]
    fn allocator_reports_overflow() {
        let last = ZoneId::new(u64::MAX).expect("max is non-zero");
        let mut allocator = ZoneIdAllocator::with_next(last);
        assert_eq!(
            allocator.allocate(),
            Err(ZoneIdError::Overflow { current: last })
        );
        assert_eq!(allocator.peek(), last);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let id = ZoneId::new(42).expect("non-zero");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
        assert_eq!(serde_json::from_str::<ZoneId>("42").ok(), Some(id));
    }

    #[test]
    fn zero_id_does_not_deserialize() {
        assert!(serde_json::from_str::<ZoneId>("0").is_err());
        assert!(serde_json::from_str::<ZoneIdAllocator>(r#"{"next":0}"#).is_err());
    }

    proptest! {
        #[test]
        fn allocator_produces_monotonic_ids(start in 1u64..1_000_000, count in 1usize..64) {
            let mut allocator = ZoneIdAllocator::with_next(ZoneId::new(start).expect("start must be valid"));
            let mut prev = 0u64;
            for _ in 0..count {
                let current = allocator.allocate().expect("allocation must succeed").get();
                prop_assert!(current > prev);
                prev = current;
            }
        }
    }
}
