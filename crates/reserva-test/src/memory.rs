//! In-memory store backing the integration tests.
//!
//! Mirrors the PostgreSQL adapter: compare-and-swap status transitions, and
//! an overlap check at insert equivalent to the database's exclusion
//! constraint over the buffer-expanded range of active bookings.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use reserva_core::types::DayOfWeek;
use reserva_db::db::enums::{BookingStatus, CancelActor};
use reserva_db::model::availability::{AvailabilityOverride, AvailabilityRule};
use reserva_db::model::booking::{Booking, NewBooking};
use reserva_db::model::offering::ServiceOffering;
use reserva_service::error::{ServiceError, ServiceResult};
use reserva_service::store::{AvailabilityStore, BookingStore};

#[derive(Default)]
struct Inner {
    offerings: HashMap<uuid::Uuid, ServiceOffering>,
    rules: Vec<AvailabilityRule>,
    overrides: Vec<AvailabilityOverride>,
    bookings: HashMap<uuid::Uuid, Booking>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_offering(&self, offering: ServiceOffering) {
        self.lock().offerings.insert(offering.id, offering);
    }

    pub fn add_rule(&self, rule: AvailabilityRule) {
        self.lock().rules.push(rule);
    }

    pub fn add_override(&self, date_override: AvailabilityOverride) {
        self.lock().overrides.push(date_override);
    }

    /// Direct read of a booking row, bypassing the store trait.
    #[must_use]
    pub fn booking_snapshot(&self, id: uuid::Uuid) -> Option<Booking> {
        self.lock().bookings.get(&id).cloned()
    }

    /// Active bookings of a provider starting on `date`.
    #[must_use]
    pub fn active_count(&self, provider_id: uuid::Uuid, date: NaiveDate) -> usize {
        self.lock()
            .bookings
            .values()
            .filter(|b| {
                b.provider_id == provider_id
                    && b.is_active()
                    && b.start_time.date_naive() == date
            })
            .count()
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn weekly_rule(
        &self,
        provider_id: uuid::Uuid,
        day_of_week: DayOfWeek,
    ) -> ServiceResult<Option<AvailabilityRule>> {
        Ok(self
            .lock()
            .rules
            .iter()
            .find(|rule| {
                rule.provider_id == provider_id
                    && rule.day_of_week == day_of_week.value()
                    && rule.active
            })
            .cloned())
    }

    async fn date_override(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Option<AvailabilityOverride>> {
        Ok(self
            .lock()
            .overrides
            .iter()
            .find(|o| o.provider_id == provider_id && o.date == date)
            .cloned())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn offering(&self, id: uuid::Uuid) -> ServiceResult<Option<ServiceOffering>> {
        Ok(self.lock().offerings.get(&id).cloned())
    }

    async fn booking(&self, id: uuid::Uuid) -> ServiceResult<Option<Booking>> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn active_on_date(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .lock()
            .bookings
            .values()
            .filter(|b| {
                b.provider_id == provider_id
                    && b.is_active()
                    && b.start_time.date_naive() == date
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn insert(&self, new: NewBooking) -> ServiceResult<Booking> {
        let now = Utc::now();
        let mut inner = self.lock();

        // The in-memory equivalent of the exclusion constraint: reject an
        // insert whose buffer-expanded span overlaps any active booking.
        let new_start =
            new.start_time - TimeDelta::minutes(i64::from(new.buffer_before_minutes));
        let new_end = new.end_time + TimeDelta::minutes(i64::from(new.buffer_after_minutes));
        let taken = inner.bookings.values().any(|b| {
            b.provider_id == new.provider_id
                && b.is_active()
                && b.expanded_start() < new_end
                && new_start < b.expanded_end()
        });
        if taken {
            return Err(ServiceError::Conflict(
                "slot was taken by a concurrent booking".to_string(),
            ));
        }

        let booking = Booking {
            id: uuid::Uuid::new_v4(),
            offering_id: new.offering_id,
            provider_id: new.provider_id,
            requester_id: new.requester_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
            buffer_before_minutes: new.buffer_before_minutes,
            buffer_after_minutes: new.buffer_after_minutes,
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            external_event_ref: None,
            external_meeting_ref: None,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn confirm(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != BookingStatus::Pending {
            return Ok(None);
        }
        booking.status = BookingStatus::Confirmed;
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }

    async fn cancel(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if !booking.status.is_active() {
            return Ok(None);
        }
        booking.status = BookingStatus::Cancelled;
        booking.cancellation_reason = reason;
        booking.cancelled_by = Some(actor);
        booking.cancelled_at = Some(now);
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }

    async fn finish(
        &self,
        id: uuid::Uuid,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != BookingStatus::Confirmed {
            return Ok(None);
        }
        booking.status = to;
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }

    async fn set_external_refs(
        &self,
        id: uuid::Uuid,
        external_event_ref: Option<String>,
        external_meeting_ref: Option<String>,
    ) -> ServiceResult<()> {
        let mut inner = self.lock();
        if let Some(booking) = inner.bookings.get_mut(&id) {
            if external_event_ref.is_some() {
                booking.external_event_ref = external_event_ref;
            }
            if external_meeting_ref.is_some() {
                booking.external_meeting_ref = external_meeting_ref;
            }
        }
        Ok(())
    }

    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ServiceResult<Vec<Booking>> {
        let mut due: Vec<Booking> = self
            .lock()
            .bookings
            .values()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && b.reminder_sent_at.is_none()
                    && b.start_time > now
                    && b.start_time <= until
            })
            .cloned()
            .collect();
        due.sort_by_key(|b| b.start_time);
        Ok(due)
    }

    async fn mark_reminder_sent(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != BookingStatus::Confirmed || booking.reminder_sent_at.is_some() {
            return Ok(None);
        }
        booking.reminder_sent_at = Some(now);
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }
}
