//! Conflict resolution: filters candidate slots against held bookings and
//! the offering's daily capacity cap.

use chrono::{DateTime, TimeDelta, Utc};

use reserva_db::model::booking::Booking;
use reserva_db::model::offering::ServiceOffering;

/// Half-open buffer-expanded span `[start, end)` occupied by a booking or a
/// candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExpandedInterval {
    /// Expanded span a candidate start would occupy under `offering`.
    #[must_use]
    pub fn for_candidate(candidate: DateTime<Utc>, offering: &ServiceOffering) -> Self {
        Self {
            start: candidate - TimeDelta::minutes(i64::from(offering.buffer_before_minutes)),
            end: candidate
                + offering.duration()
                + TimeDelta::minutes(i64::from(offering.buffer_after_minutes)),
        }
    }

    /// Expanded span of an existing booking, using the buffers frozen on the
    /// booking row (never re-read from a possibly-changed offering).
    #[must_use]
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            start: booking.expanded_start(),
            end: booking.expanded_end(),
        }
    }

    /// Half-open interval overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Whether an offering's daily cap is already filled by `active_count`
/// bookings. `None` means unbounded.
#[must_use]
pub fn daily_cap_reached(active_count: usize, max_per_day: Option<i32>) -> bool {
    match max_per_day {
        Some(cap) => active_count >= usize::try_from(cap).unwrap_or(usize::MAX),
        None => false,
    }
}

/// Whether `candidate` collides with any active existing booking.
#[must_use]
pub fn has_conflict(
    candidate: DateTime<Utc>,
    existing: &[Booking],
    offering: &ServiceOffering,
) -> bool {
    let span = ExpandedInterval::for_candidate(candidate, offering);
    existing
        .iter()
        .filter(|booking| booking.is_active())
        .any(|booking| span.overlaps(&ExpandedInterval::for_booking(booking)))
}

/// ## Summary
/// Filters `candidates` against the provider's existing active bookings,
/// enforcing the daily cap first: a filled cap empties the whole list with
/// no per-slot work. Survivors keep their input order.
#[must_use]
pub fn resolve(
    candidates: Vec<DateTime<Utc>>,
    existing: &[Booking],
    offering: &ServiceOffering,
) -> Vec<DateTime<Utc>> {
    let active_count = existing.iter().filter(|b| b.is_active()).count();
    if daily_cap_reached(active_count, offering.max_per_day) {
        return Vec::new();
    }

    candidates
        .into_iter()
        .filter(|candidate| !has_conflict(*candidate, existing, offering))
        .collect()
}
