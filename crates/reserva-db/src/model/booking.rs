use diesel::{pg::Pg, prelude::*};

use crate::db::{
    enums::{BookingStatus, CancelActor},
    schema,
};

/// A held (or historical) appointment for a provider.
///
/// `end_time` is `start_time + offering.duration_minutes`, computed once at
/// creation and never recomputed. Both buffers are copied from the offering
/// at creation so later offering edits cannot move a held slot.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::booking)]
#[diesel(check_for_backend(Pg))]
pub struct Booking {
    pub id: uuid::Uuid,
    pub offering_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub requester_id: uuid::Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: BookingStatus,
    pub buffer_before_minutes: i32,
    pub buffer_after_minutes: i32,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cancelled_by: Option<CancelActor>,
    /// Opaque reference into the external calendar collaborator.
    pub external_event_ref: Option<String>,
    /// Opaque reference into the external meeting collaborator.
    pub external_meeting_ref: Option<String>,
    pub reminder_sent_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Booking {
    /// Start of the buffer-expanded span this booking occupies.
    #[must_use]
    pub fn expanded_start(&self) -> chrono::DateTime<chrono::Utc> {
        self.start_time - chrono::TimeDelta::minutes(i64::from(self.buffer_before_minutes))
    }

    /// End (exclusive) of the buffer-expanded span this booking occupies.
    #[must_use]
    pub fn expanded_end(&self) -> chrono::DateTime<chrono::Utc> {
        self.end_time + chrono::TimeDelta::minutes(i64::from(self.buffer_after_minutes))
    }

    /// Whether this booking holds its slot (pending or confirmed).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Insert struct for creating new bookings
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::booking)]
pub struct NewBooking {
    pub offering_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub requester_id: uuid::Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: BookingStatus,
    pub buffer_before_minutes: i32,
    pub buffer_after_minutes: i32,
}
