//! Unit tests for conflict resolution.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use reserva_db::db::enums::BookingStatus;
use reserva_db::model::booking::Booking;

use crate::scheduling::conflict::{ExpandedInterval, daily_cap_reached, has_conflict, resolve};
use crate::scheduling::fixtures;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2026, 8, 24)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
        .and_utc()
}

fn grid() -> Vec<DateTime<Utc>> {
    vec![at(9, 0), at(10, 15), at(11, 30), at(12, 45), at(14, 0), at(15, 15)]
}

fn confirmed_10_to_11(provider: uuid::Uuid) -> Booking {
    fixtures::booking(provider, at(10, 0), at(11, 0), 15, BookingStatus::Confirmed)
}

#[test]
fn existing_booking_knocks_out_overlapping_candidates() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let existing = vec![confirmed_10_to_11(provider)];

    let surviving = resolve(grid(), &existing, &offering);

    // [10:00, 11:15) also collides with the 09:00 candidate's trailing
    // buffer ([09:00, 10:15)) and with the 10:15 candidate itself; the first
    // surviving slot is 11:30.
    assert_eq!(surviving, vec![at(11, 30), at(12, 45), at(14, 0), at(15, 15)]);
}

#[test]
fn eleven_oclock_slot_never_survives_next_to_ten_oclock_booking() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let existing = vec![confirmed_10_to_11(provider)];

    assert!(has_conflict(at(11, 0), &existing, &offering));
}

#[test]
fn cancelled_and_no_show_bookings_never_conflict() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let existing = vec![
        fixtures::booking(provider, at(10, 0), at(11, 0), 15, BookingStatus::Cancelled),
        fixtures::booking(provider, at(12, 45), at(13, 45), 15, BookingStatus::NoShow),
    ];

    assert_eq!(resolve(grid(), &existing, &offering), grid());
}

#[test]
fn adjacent_intervals_do_not_overlap() {
    // Half-open spans: one ending exactly where the other starts is fine.
    let a = ExpandedInterval {
        start: at(9, 0),
        end: at(10, 0),
    };
    let b = ExpandedInterval {
        start: at(10, 0),
        end: at(11, 0),
    };
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
}

#[test]
fn zero_buffer_candidate_may_start_at_booking_end() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 0);
    let existing = vec![fixtures::booking(
        provider,
        at(10, 0),
        at(11, 0),
        0,
        BookingStatus::Confirmed,
    )];

    assert!(!has_conflict(at(11, 0), &existing, &offering));
    assert!(has_conflict(at(10, 30), &existing, &offering));
}

#[test]
fn filled_daily_cap_empties_the_list_without_overlap() {
    let provider = uuid::Uuid::new_v4();
    let mut offering = fixtures::offering(60, 15);
    offering.max_per_day = Some(2);

    // Two active bookings late in the day; the morning grid is overlap-free
    // but the cap still wins.
    let existing = vec![
        fixtures::booking(provider, at(14, 0), at(15, 0), 15, BookingStatus::Confirmed),
        fixtures::booking(provider, at(15, 15), at(16, 15), 15, BookingStatus::Pending),
    ];

    assert!(resolve(vec![at(9, 0), at(10, 15)], &existing, &offering).is_empty());
}

#[test]
fn cancelled_bookings_do_not_count_toward_the_cap() {
    let provider = uuid::Uuid::new_v4();
    let mut offering = fixtures::offering(60, 15);
    offering.max_per_day = Some(1);

    let existing = vec![fixtures::booking(
        provider,
        at(14, 0),
        at(15, 0),
        15,
        BookingStatus::Cancelled,
    )];

    assert_eq!(resolve(vec![at(9, 0)], &existing, &offering), vec![at(9, 0)]);
}

#[test]
fn unbounded_cap_never_fills() {
    assert!(!daily_cap_reached(1000, None));
    assert!(daily_cap_reached(5, Some(5)));
    assert!(!daily_cap_reached(4, Some(5)));
}

#[test]
fn survivors_keep_input_order() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let existing = vec![confirmed_10_to_11(provider)];

    let surviving = resolve(grid(), &existing, &offering);
    let mut sorted = surviving.clone();
    sorted.sort_unstable();
    assert_eq!(surviving, sorted);
}

#[test]
fn frozen_buffers_are_used_for_existing_bookings() {
    let provider = uuid::Uuid::new_v4();
    // Offering has since been edited down to zero buffer, but the booking
    // row froze 15 minutes; the 11:00 candidate must still be rejected.
    let offering = fixtures::offering(60, 0);
    let existing = vec![confirmed_10_to_11(provider)];

    assert!(has_conflict(at(11, 0), &existing, &offering));
}
