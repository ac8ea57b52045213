#![forbid(unsafe_code)]

//! Reservation records and the validation rules for new bookings.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use placegrid_core::ZoneId;
use serde::{Deserialize, Serialize};

/// Title stored for a reservation submitted with a blank title.
pub const UNTITLED_RESERVATION: &str = "Untitled reservation";

/// Form input for a new reservation. Any field may still be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub title: String,
}

impl ReservationRequest {
    /// A fully populated request.
    #[must_use]
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime, title: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            start: Some(start),
            end: Some(end),
            title: title.into(),
        }
    }
}

/// A booked time slot on one zone. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub zone: ZoneId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub title: String,
}

impl Reservation {
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Half-open overlap with `[start, end)` on the same date. Back-to-back
    /// slots sharing a boundary do not overlap.
    #[must_use]
    pub fn overlaps(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.date == date && start < self.end && end > self.start
    }

    /// Sort key within a zone's list.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.start)
    }
}

/// Form field named by [`ReservationRejection::MissingField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestField {
    Date,
    Start,
    End,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Start => "start time",
            Self::End => "end time",
        })
    }
}

/// Why a reservation was refused. `Display` renders the message shown to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ReservationRejection {
    MissingField {
        field: RequestField,
    },
    StartsInPast {
        start: NaiveDateTime,
        earliest: NaiveDateTime,
    },
    EndNotAfterStart {
        start: NaiveTime,
        end: NaiveTime,
    },
    Overlaps {
        existing_start: NaiveTime,
        existing_end: NaiveTime,
        existing_title: String,
    },
}

impl fmt::Display for ReservationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "Please fill in the {field} before reserving.")
            }
            Self::StartsInPast { earliest, .. } => write!(
                f,
                "Reservations cannot start in the past (earliest start is {}).",
                earliest.format("%Y-%m-%d %H:%M")
            ),
            Self::EndNotAfterStart { .. } => write!(f, "End time must be after start time."),
            Self::Overlaps {
                existing_start,
                existing_end,
                existing_title,
            } => write!(
                f,
                "This time overlaps \"{existing_title}\" ({}-{}).",
                existing_start.format("%H:%M"),
                existing_end.format("%H:%M")
            ),
        }
    }
}

impl std::error::Error for ReservationRejection {}

/// Check `request` for `zone` against the zone's existing reservations.
///
/// Rules run in order and the first failure wins:
/// 1. date, start and end are present
/// 2. the start is no earlier than `now - grace`
/// 3. the end is after the start
/// 4. no existing reservation on the same date overlaps `[start, end)`
///
/// On success returns the reservation to insert, with a blank title replaced
/// by [`UNTITLED_RESERVATION`].
pub fn validate_request(
    zone: ZoneId,
    request: &ReservationRequest,
    existing: &[Reservation],
    now: NaiveDateTime,
    grace: TimeDelta,
) -> Result<Reservation, ReservationRejection> {
    let date = request.date.ok_or(ReservationRejection::MissingField {
        field: RequestField::Date,
    })?;
    let start = request.start.ok_or(ReservationRejection::MissingField {
        field: RequestField::Start,
    })?;
    let end = request.end.ok_or(ReservationRejection::MissingField {
        field: RequestField::End,
    })?;

    let starts_at = date.and_time(start);
    if let Some(earliest) = now.checked_sub_signed(grace)
        && starts_at < earliest
    {
        return Err(ReservationRejection::StartsInPast {
            start: starts_at,
            earliest,
        });
    }
    if end <= start {
        return Err(ReservationRejection::EndNotAfterStart { start, end });
    }
    if let Some(clash) = existing
        .iter()
        .find(|r| r.zone == zone && r.overlaps(date, start, end))
    {
        return Err(ReservationRejection::Overlaps {
            existing_start: clash.start,
            existing_end: clash.end,
            existing_title: clash.title.clone(),
        });
    }

    let title = request.title.trim();
    Ok(Reservation {
        zone,
        date,
        start,
        end,
        title: if title.is_empty() {
            UNTITLED_RESERVATION.to_string()
        } else {
            title.to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn zone() -> ZoneId {
        ZoneId::new(1).expect("non-zero")
    }

    fn grace() -> TimeDelta {
        TimeDelta::minutes(5)
    }

    fn early_morning() -> NaiveDateTime {
        date(2024, 1, 1).and_time(time(0, 0))
    }

    #[test]
    fn missing_fields_are_reported_first() {
        let request = ReservationRequest {
            date: Some(date(2024, 1, 1)),
            start: None,
            end: Some(time(8, 0)),
            title: String::new(),
        };
        let rejection = validate_request(zone(), &request, &[], early_morning(), grace())
            .expect_err("start is missing");
        assert_eq!(
            rejection,
            ReservationRejection::MissingField {
                field: RequestField::Start
            }
        );
        assert_eq!(
            rejection.to_string(),
            "Please fill in the start time before reserving."
        );
    }

    #[test]
    fn past_check_precedes_ordering_check() {
        let now = date(2024, 1, 1).and_time(time(10, 0));
        let request = ReservationRequest::new(date(2024, 1, 1), time(9, 0), time(8, 0), "");
        assert!(matches!(
            validate_request(zone(), &request, &[], now, grace()),
            Err(ReservationRejection::StartsInPast { .. })
        ));
    }

    #[test]
    fn end_must_follow_start() {
        let request = ReservationRequest::new(date(2024, 1, 1), time(9, 0), time(9, 0), "");
        assert_eq!(
            validate_request(zone(), &request, &[], early_morning(), grace()),
            Err(ReservationRejection::EndNotAfterStart {
                start: time(9, 0),
                end: time(9, 0)
            })
        );
    }

    #[test]
    fn blank_title_gets_placeholder() {
        let request = ReservationRequest::new(date(2024, 1, 1), time(9, 0), time(10, 0), "   ");
        let reservation =
            validate_request(zone(), &request, &[], early_morning(), grace()).expect("valid");
        assert_eq!(reservation.title, UNTITLED_RESERVATION);
        assert_eq!(reservation.duration(), TimeDelta::hours(1));
    }

    #[test]
    fn overlap_is_half_open_and_per_date() {
        let existing = Reservation {
            zone: zone(),
            date: date(2024, 1, 1),
            start: time(9, 0),
            end: time(10, 0),
            title: "Standup".to_string(),
        };
        assert!(existing.overlaps(date(2024, 1, 1), time(9, 30), time(10, 30)));
        assert!(!existing.overlaps(date(2024, 1, 1), time(10, 0), time(11, 0)));
        assert!(!existing.overlaps(date(2024, 1, 1), time(8, 0), time(9, 0)));
        assert!(!existing.overlaps(date(2024, 1, 2), time(9, 30), time(10, 30)));

        let request = ReservationRequest::new(date(2024, 1, 1), time(8, 30), time(9, 15), "");
        let rejection = validate_request(zone(), &request, &[existing], early_morning(), grace())
            .expect_err("overlaps");
        assert_eq!(rejection.to_string(), "This time overlaps \"Standup\" (09:00-10:00).");
    }

    #[test]
    fn rejection_serializes_with_reason_tag() {
        let json = serde_json::to_string(&ReservationRejection::MissingField {
            field: RequestField::Date,
        })
        .expect("serialize");
        assert_eq!(json, r#"{"reason":"missing_field","field":"date"}"#);
    }
}
