//! Storage ports for the scheduling engine.
//!
//! The engine talks to persistence through these traits so the scheduling
//! and lifecycle logic stays independent of the backend. The production
//! implementation is [`pg::PgStore`]; the test-support crate provides an
//! in-memory one with the same transition semantics.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use reserva_core::types::DayOfWeek;
use reserva_db::db::enums::{BookingStatus, CancelActor};
use reserva_db::model::availability::{AvailabilityOverride, AvailabilityRule};
use reserva_db::model::booking::{Booking, NewBooking};
use reserva_db::model::offering::ServiceOffering;

use crate::error::ServiceResult;

pub mod pg;

/// Read access to a provider's recurring weekly rules and date overrides.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// The active weekly rule for the weekday, if any.
    async fn weekly_rule(
        &self,
        provider_id: uuid::Uuid,
        day_of_week: DayOfWeek,
    ) -> ServiceResult<Option<AvailabilityRule>>;

    /// The override for the exact date, if any.
    async fn date_override(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Option<AvailabilityOverride>>;
}

/// Durable storage for offerings and bookings.
///
/// Status transitions are compare-and-swap shaped: they succeed with the
/// updated row only when the booking is still in the expected source state,
/// and return `Ok(None)` otherwise. Implementations must make each call
/// atomic with respect to concurrent transitions of the same booking.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn offering(&self, id: uuid::Uuid) -> ServiceResult<Option<ServiceOffering>>;

    async fn booking(&self, id: uuid::Uuid) -> ServiceResult<Option<Booking>>;

    /// Active (pending or confirmed) bookings of a provider starting on the
    /// given date, ascending by start time.
    async fn active_on_date(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Vec<Booking>>;

    /// Inserts a new booking. A lost race against a concurrent overlapping
    /// insert surfaces as `ServiceError::Conflict`.
    async fn insert(&self, new: NewBooking) -> ServiceResult<Booking>;

    /// `pending -> confirmed`; `Ok(None)` if the booking is not pending.
    async fn confirm(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>>;

    /// `pending|confirmed -> cancelled`; `Ok(None)` if the booking is not active.
    async fn cancel(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>>;

    /// `confirmed -> completed|no_show`; `Ok(None)` if the booking is not confirmed.
    async fn finish(
        &self,
        id: uuid::Uuid,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>>;

    /// Records collaborator references; `None` fields are left untouched.
    async fn set_external_refs(
        &self,
        id: uuid::Uuid,
        external_event_ref: Option<String>,
        external_meeting_ref: Option<String>,
    ) -> ServiceResult<()>;

    /// Confirmed, un-reminded bookings starting in `(now, until]`.
    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ServiceResult<Vec<Booking>>;

    /// Claims the reminder for a booking; `Ok(None)` if already claimed or
    /// no longer confirmed.
    async fn mark_reminder_sent(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>>;
}
