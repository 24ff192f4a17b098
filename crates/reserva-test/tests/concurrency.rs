#![allow(clippy::expect_used)]
//! Booking-creation races: concurrent requests for the same provider and
//! overlapping time must produce exactly one winner.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use reserva_service::error::ServiceError;
use reserva_test::fixtures;
use reserva_test::memory::MemoryStore;
use reserva_test::recording::RecordingNotifier;

fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("valid test timestamp")
}

const FRIDAY_9AM: &str = "2026-08-21T09:00:00Z";
const MONDAY: &str = "2026-08-24";

fn setup() -> (
    Arc<MemoryStore>,
    Arc<reserva_service::booking::service::BookingService>,
    uuid::Uuid,
    uuid::Uuid,
) {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let provider_id = uuid::Uuid::new_v4();
    let offering = fixtures::offering();
    let offering_id = offering.id;

    store.add_offering(offering);
    store.add_rule(fixtures::weekly_rule(
        provider_id,
        0,
        "09:00:00".parse::<NaiveTime>().expect("valid time"),
        "17:00:00".parse::<NaiveTime>().expect("valid time"),
    ));

    let service = Arc::new(fixtures::engine(&store, &notifier));
    (store, service, offering_id, provider_id)
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn identical_concurrent_creates_yield_one_winner() {
    let (store, service, offering_id, provider_id) = setup();
    let start = ts("2026-08-24T10:00:00Z");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            service
                .create_booking_at(
                    offering_id,
                    provider_id,
                    uuid::Uuid::new_v4(),
                    start,
                    ts(FRIDAY_9AM),
                )
                .await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.expect("task join") {
            Ok(_) => winners += 1,
            Err(ServiceError::Conflict(_)) => conflicts += 1,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);

    let monday: NaiveDate = MONDAY.parse().expect("valid date");
    assert_eq!(store.active_count(provider_id, monday), 1);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_creates_for_distinct_slots_both_succeed() {
    let (store, service, offering_id, provider_id) = setup();

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_booking_at(
                    offering_id,
                    provider_id,
                    uuid::Uuid::new_v4(),
                    ts("2026-08-24T09:00:00Z"),
                    ts(FRIDAY_9AM),
                )
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_booking_at(
                    offering_id,
                    provider_id,
                    uuid::Uuid::new_v4(),
                    ts("2026-08-24T11:30:00Z"),
                    ts(FRIDAY_9AM),
                )
                .await
        })
    };

    first.await.expect("task join").expect("09:00 booking");
    second.await.expect("task join").expect("11:30 booking");

    let monday: NaiveDate = MONDAY.parse().expect("valid date");
    assert_eq!(store.active_count(provider_id, monday), 2);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn buffer_overlapping_concurrent_creates_exclude_each_other() {
    let (store, service, offering_id, provider_id) = setup();

    // 10:00-11:00 and 11:00-12:00: adjacent occupations, but the first
    // booking's trailing buffer extends to 11:15.
    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_booking_at(
                    offering_id,
                    provider_id,
                    uuid::Uuid::new_v4(),
                    ts("2026-08-24T10:00:00Z"),
                    ts(FRIDAY_9AM),
                )
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_booking_at(
                    offering_id,
                    provider_id,
                    uuid::Uuid::new_v4(),
                    ts("2026-08-24T11:00:00Z"),
                    ts(FRIDAY_9AM),
                )
                .await
        })
    };

    let results = [
        first.await.expect("task join"),
        second.await.expect("task join"),
    ];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(ServiceError::Conflict(_))))
    );

    let monday: NaiveDate = MONDAY.parse().expect("valid date");
    assert_eq!(store.active_count(provider_id, monday), 1);
}
