//! Shared builders for scheduling unit tests.

use chrono::{DateTime, Utc};

use reserva_db::db::enums::BookingStatus;
use reserva_db::model::booking::Booking;
use reserva_db::model::offering::ServiceOffering;

pub fn offering(duration_minutes: i32, buffer_after_minutes: i32) -> ServiceOffering {
    let now = Utc::now();
    ServiceOffering {
        id: uuid::Uuid::new_v4(),
        name: "Consultation".to_string(),
        duration_minutes,
        buffer_before_minutes: 0,
        buffer_after_minutes,
        min_notice_hours: 24,
        max_advance_days: 30,
        max_per_day: Some(5),
        requires_confirmation: false,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn booking(
    provider_id: uuid::Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    buffer_after_minutes: i32,
    status: BookingStatus,
) -> Booking {
    let now = Utc::now();
    Booking {
        id: uuid::Uuid::new_v4(),
        offering_id: uuid::Uuid::new_v4(),
        provider_id,
        requester_id: uuid::Uuid::new_v4(),
        start_time,
        end_time,
        status,
        buffer_before_minutes: 0,
        buffer_after_minutes,
        cancellation_reason: None,
        cancelled_at: None,
        cancelled_by: None,
        external_event_ref: None,
        external_meeting_ref: None,
        reminder_sent_at: None,
        created_at: now,
        updated_at: now,
    }
}
