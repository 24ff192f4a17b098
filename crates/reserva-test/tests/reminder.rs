#![allow(clippy::expect_used)]
//! Reminder scheduler sweeps: claim-before-send idempotency.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use reserva_db::db::enums::BookingStatus;
use reserva_db::model::booking::NewBooking;
use reserva_service::reminder::ReminderScheduler;
use reserva_service::store::BookingStore;
use reserva_test::fixtures;
use reserva_test::memory::MemoryStore;
use reserva_test::recording::RecordingNotifier;

fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("valid test timestamp")
}

async fn seed_booking(
    store: &Arc<MemoryStore>,
    start: DateTime<Utc>,
    status: BookingStatus,
) -> uuid::Uuid {
    let booking = store
        .insert(NewBooking {
            offering_id: uuid::Uuid::new_v4(),
            provider_id: uuid::Uuid::new_v4(),
            requester_id: uuid::Uuid::new_v4(),
            start_time: start,
            end_time: start + TimeDelta::hours(1),
            status,
            buffer_before_minutes: 0,
            buffer_after_minutes: 15,
        })
        .await
        .expect("seeded booking");
    booking.id
}

fn scheduler(
    store: &Arc<MemoryStore>,
    notifier: &Arc<RecordingNotifier>,
    lead_hours: i64,
) -> ReminderScheduler {
    ReminderScheduler::new(
        Arc::clone(store) as _,
        fixtures::collaborators(notifier),
        TimeDelta::hours(lead_hours),
        Duration::from_secs(60),
    )
}

#[test_log::test(tokio::test)]
async fn tick_claims_then_notifies_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let now = ts("2026-08-23T09:00:00Z");

    let id = seed_booking(
        &store,
        now + TimeDelta::hours(12),
        BookingStatus::Confirmed,
    )
    .await;

    let scheduler = scheduler(&store, &notifier, 24);

    let sent = scheduler.tick(now).await.expect("first sweep");
    assert_eq!(sent, 1);
    assert_eq!(notifier.events_named("reminder"), vec![id]);

    let snapshot = store.booking_snapshot(id).expect("booking row");
    assert_eq!(snapshot.reminder_sent_at, Some(now));

    // The claim is persisted; a second sweep finds nothing due.
    let sent = scheduler.tick(now).await.expect("second sweep");
    assert_eq!(sent, 0);
    assert_eq!(notifier.events_named("reminder").len(), 1);
}

#[test_log::test(tokio::test)]
async fn only_confirmed_bookings_inside_the_lead_window_are_due() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let now = ts("2026-08-23T09:00:00Z");

    // Pending, outside the window, and already started: none are due.
    seed_booking(&store, now + TimeDelta::hours(12), BookingStatus::Pending).await;
    seed_booking(&store, now + TimeDelta::hours(48), BookingStatus::Confirmed).await;
    seed_booking(&store, now - TimeDelta::hours(1), BookingStatus::Confirmed).await;

    let due = seed_booking(
        &store,
        now + TimeDelta::hours(6),
        BookingStatus::Confirmed,
    )
    .await;

    let scheduler = scheduler(&store, &notifier, 24);
    let sent = scheduler.tick(now).await.expect("sweep");

    assert_eq!(sent, 1);
    assert_eq!(notifier.events_named("reminder"), vec![due]);
}

#[test_log::test(tokio::test)]
async fn scheduler_task_starts_and_stops() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let handle = scheduler(&store, &notifier, 24).start();
    handle.stop().await;
}
