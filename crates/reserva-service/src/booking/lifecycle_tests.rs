use chrono::{DateTime, TimeDelta, Utc};

use reserva_db::db::enums::BookingStatus;

use super::lifecycle::{can_cancel, can_reschedule};
use crate::scheduling::fixtures;

fn now() -> DateTime<Utc> {
    "2026-08-21T09:00:00Z"
        .parse()
        .expect("valid test timestamp")
}

fn booking_starting_in(hours: i64, status: BookingStatus) -> reserva_db::model::booking::Booking {
    let start = now() + TimeDelta::hours(hours);
    fixtures::booking(
        uuid::Uuid::new_v4(),
        start,
        start + TimeDelta::hours(1),
        0,
        status,
    )
}

#[test]
fn cancellation_allowed_outside_the_notice_window() {
    let booking = booking_starting_in(25, BookingStatus::Confirmed);
    assert!(can_cancel(&booking, now(), TimeDelta::hours(24)));
}

#[test]
fn cancellation_refused_inside_the_notice_window() {
    let booking = booking_starting_in(23, BookingStatus::Confirmed);
    assert!(!can_cancel(&booking, now(), TimeDelta::hours(24)));
}

#[test]
fn notice_boundary_is_strict() {
    // now + 24h == start_time exactly; "strictly before" fails.
    let booking = booking_starting_in(24, BookingStatus::Pending);
    assert!(!can_cancel(&booking, now(), TimeDelta::hours(24)));
}

#[test]
fn terminal_bookings_are_never_cancellable() {
    for status in [
        BookingStatus::Cancelled,
        BookingStatus::Completed,
        BookingStatus::NoShow,
    ] {
        let booking = booking_starting_in(48, status);
        assert!(
            !can_cancel(&booking, now(), TimeDelta::hours(24)),
            "{status} booking must not be cancellable"
        );
    }
}

#[test]
fn pending_bookings_follow_the_same_policy() {
    let booking = booking_starting_in(48, BookingStatus::Pending);
    assert!(can_cancel(&booking, now(), TimeDelta::hours(24)));
}

#[test]
fn reschedule_eligibility_mirrors_cancellation() {
    let eligible = booking_starting_in(48, BookingStatus::Confirmed);
    let too_late = booking_starting_in(12, BookingStatus::Confirmed);
    assert!(can_reschedule(&eligible, now(), TimeDelta::hours(24)));
    assert!(!can_reschedule(&too_late, now(), TimeDelta::hours(24)));
}

#[test]
fn stricter_policies_can_be_supplied() {
    let booking = booking_starting_in(48, BookingStatus::Confirmed);
    assert!(!can_cancel(&booking, now(), TimeDelta::hours(72)));
}
