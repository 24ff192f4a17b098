//! The engine's public surface: availability queries and race-safe booking
//! creation.
//!
//! Creation never trusts a previously listed slot: the conflict check is
//! re-run against the live active-booking set inside a per-(provider, date)
//! critical section, with the database overlap constraint as the
//! cross-process backstop (a lost race there also surfaces as `Conflict`).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use tokio::sync::Mutex;

use reserva_core::types::DayOfWeek;
use reserva_db::db::enums::{BookingStatus, CancelActor};
use reserva_db::model::booking::{Booking, NewBooking};
use reserva_db::model::offering::ServiceOffering;

use crate::booking::lifecycle::BookingLifecycleManager;
use crate::collaborator::Collaborators;
use crate::error::{ServiceError, ServiceResult};
use crate::scheduling::conflict;
use crate::scheduling::slot::{SlotGenerator, beyond_horizon};
use crate::store::{AvailabilityStore, BookingStore};

/// Per-(provider, date) async mutex registry serialising booking creation
/// within this process.
#[derive(Default)]
struct SlotLocks {
    inner: Mutex<HashMap<(uuid::Uuid, NaiveDate), Arc<Mutex<()>>>>,
}

impl SlotLocks {
    async fn acquire(&self, provider_id: uuid::Uuid, date: NaiveDate) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        Arc::clone(map.entry((provider_id, date)).or_default())
    }

    /// Drops the registry entry once no task holds a clone of it anymore.
    /// Callers release their `Arc` first; entries a concurrent `acquire`
    /// still holds stay in the map until the last holder releases.
    async fn release(&self, provider_id: uuid::Uuid, date: NaiveDate) {
        let mut map = self.inner.lock().await;
        if let Some(lock) = map.get(&(provider_id, date))
            && Arc::strong_count(lock) == 1
        {
            map.remove(&(provider_id, date));
        }
    }
}

pub struct BookingService {
    store: Arc<dyn BookingStore>,
    availability: Arc<dyn AvailabilityStore>,
    slots: SlotGenerator,
    lifecycle: BookingLifecycleManager,
    locks: SlotLocks,
}

impl BookingService {
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        availability: Arc<dyn AvailabilityStore>,
        collaborators: Arc<Collaborators>,
        cancellation_notice: TimeDelta,
    ) -> Self {
        Self {
            slots: SlotGenerator::new(Arc::clone(&availability)),
            lifecycle: BookingLifecycleManager::new(
                Arc::clone(&store),
                collaborators,
                cancellation_notice,
            ),
            store,
            availability,
            locks: SlotLocks::default(),
        }
    }

    async fn require_offering(&self, id: uuid::Uuid) -> ServiceResult<ServiceOffering> {
        self.store
            .offering(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("offering {id}")))
    }

    /// ## Summary
    /// Bookable start times for the offering on `date`: the generated
    /// candidates minus anything conflicting with the provider's active
    /// bookings or the daily cap. Empty for an inactive offering.
    ///
    /// ## Errors
    /// `NotFound` for an unknown offering; storage errors propagate.
    #[tracing::instrument(skip(self))]
    pub async fn list_available_slots_at(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<DateTime<Utc>>> {
        let offering = self.require_offering(offering_id).await?;
        if !offering.active {
            return Ok(Vec::new());
        }

        let candidates = self.slots.generate(&offering, provider_id, date, now).await?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let existing = self.store.active_on_date(provider_id, date).await?;
        Ok(conflict::resolve(candidates, &existing, &offering))
    }

    /// ## Summary
    /// The dates within the next `days_ahead` days (clamped to the
    /// offering's advance horizon) that still have at least one bookable
    /// slot, ascending from today.
    ///
    /// ## Errors
    /// `NotFound` for an unknown offering; storage errors propagate.
    #[tracing::instrument(skip(self))]
    pub async fn list_available_dates_at(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        days_ahead: i32,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<NaiveDate>> {
        let offering = self.require_offering(offering_id).await?;
        if !offering.active {
            return Ok(Vec::new());
        }

        let horizon = days_ahead.clamp(0, offering.max_advance_days);
        let today = now.date_naive();

        let mut dates = Vec::new();
        for offset in 0..=i64::from(horizon) {
            let date = today + TimeDelta::days(offset);
            let candidates = self.slots.generate(&offering, provider_id, date, now).await?;
            if candidates.is_empty() {
                continue;
            }
            let existing = self.store.active_on_date(provider_id, date).await?;
            if !conflict::resolve(candidates, &existing, &offering).is_empty() {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    /// ## Summary
    /// Creates a booking at the requested start time. The end time is
    /// recomputed from the offering and the offering's current buffers are
    /// frozen onto the row. The initial status is `pending` when the
    /// offering requires confirmation, `confirmed` otherwise.
    ///
    /// The conflict check and insert run inside the per-(provider, date)
    /// critical section; see the module docs for the race model.
    ///
    /// ## Errors
    /// `Validation` when the start time fails the notice, horizon,
    /// override, or working-window checks; `Conflict` when the slot or the
    /// daily cap was lost to another booking; `NotFound` for an unknown
    /// offering.
    #[tracing::instrument(skip(self))]
    pub async fn create_booking_at(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        requester_id: uuid::Uuid,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        let offering = self.require_offering(offering_id).await?;
        if !offering.active {
            return Err(ServiceError::Validation(
                "offering is not accepting bookings".to_string(),
            ));
        }

        let date = start_time.date_naive();
        self.validate_requested_start(&offering, provider_id, date, start_time, now)
            .await?;

        let end_time = start_time + offering.duration();
        let status = if offering.requires_confirmation {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        };

        let lock = self.locks.acquire(provider_id, date).await;
        let inserted = {
            let _guard = lock.lock().await;
            self.insert_checked(
                &offering,
                NewBooking {
                    offering_id,
                    provider_id,
                    requester_id,
                    start_time,
                    end_time,
                    status,
                    buffer_before_minutes: offering.buffer_before_minutes,
                    buffer_after_minutes: offering.buffer_after_minutes,
                },
            )
            .await
        };
        // Release our clone before pruning so an uncontended entry is
        // removed; the registry must not grow with every booked date.
        drop(lock);
        self.locks.release(provider_id, date).await;
        let booking = inserted?;

        tracing::info!(booking_id = %booking.id, status = %booking.status, "Booking created");

        // Side effects stay outside the critical section.
        if booking.status == BookingStatus::Confirmed {
            self.lifecycle.emit_confirmed(&booking).await;
        }
        Ok(booking)
    }

    /// Runs inside the per-(provider, date) critical section: re-checks the
    /// daily cap and the buffer-expanded overlap against the live active
    /// set, then inserts.
    async fn insert_checked(
        &self,
        offering: &ServiceOffering,
        new_booking: NewBooking,
    ) -> ServiceResult<Booking> {
        let date = new_booking.start_time.date_naive();
        let existing = self
            .store
            .active_on_date(new_booking.provider_id, date)
            .await?;
        let active_count = existing.iter().filter(|b| b.is_active()).count();
        if conflict::daily_cap_reached(active_count, offering.max_per_day) {
            return Err(ServiceError::Conflict(
                "daily booking limit reached for this provider".to_string(),
            ));
        }
        if conflict::has_conflict(new_booking.start_time, &existing, offering) {
            return Err(ServiceError::Conflict(
                "requested time conflicts with an existing booking".to_string(),
            ));
        }
        self.store.insert(new_booking).await
    }

    /// Availability gates for a requested start: notice, horizon, override,
    /// and containment in the weekday's working window.
    async fn validate_requested_start(
        &self,
        offering: &ServiceOffering,
        provider_id: uuid::Uuid,
        date: NaiveDate,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        if start_time <= now + offering.min_notice() {
            return Err(ServiceError::Validation(format!(
                "start time is inside the {}h minimum notice period",
                offering.min_notice_hours
            )));
        }
        if beyond_horizon(date, now, offering.max_advance_days) {
            return Err(ServiceError::Validation(format!(
                "start time is beyond the {}-day booking horizon",
                offering.max_advance_days
            )));
        }

        if let Some(date_override) = self.availability.date_override(provider_id, date).await?
            && !date_override.is_available
        {
            return Err(ServiceError::Validation(format!(
                "provider is unavailable on {date}"
            )));
        }

        let Some(rule) = self
            .availability
            .weekly_rule(provider_id, DayOfWeek::of(date))
            .await?
        else {
            return Err(ServiceError::Validation(format!(
                "provider has no working hours on {date}"
            )));
        };

        let window_start = date.and_time(rule.start_time).and_utc();
        let window_end = date.and_time(rule.end_time).and_utc();
        if start_time < window_start || start_time + offering.duration() > window_end {
            return Err(ServiceError::Validation(
                "requested time falls outside the provider's working hours".to_string(),
            ));
        }
        Ok(())
    }

    /// ## Errors
    /// See [`BookingLifecycleManager::confirm`].
    pub async fn confirm_booking_at(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.lifecycle.confirm(id, now).await
    }

    /// ## Errors
    /// See [`BookingLifecycleManager::cancel`].
    pub async fn cancel_booking_at(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.lifecycle.cancel(id, reason, actor, now).await
    }

    /// ## Errors
    /// See [`BookingLifecycleManager::mark_completed`].
    pub async fn mark_completed_at(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.lifecycle.mark_completed(id, now).await
    }

    /// ## Errors
    /// See [`BookingLifecycleManager::mark_no_show`].
    pub async fn mark_no_show_at(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.lifecycle.mark_no_show(id, now).await
    }

    /// ## Errors
    /// `NotFound` for an unknown booking id.
    pub async fn booking(&self, id: uuid::Uuid) -> ServiceResult<Booking> {
        self.store
            .booking(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {id}")))
    }

    // Wall-clock entry points used by the HTTP layer; the `_at` variants
    // exist so tests can pin `now`.

    /// ## Errors
    /// See [`Self::list_available_slots_at`].
    pub async fn list_available_slots(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Vec<DateTime<Utc>>> {
        self.list_available_slots_at(offering_id, provider_id, date, Utc::now())
            .await
    }

    /// ## Errors
    /// See [`Self::list_available_dates_at`].
    pub async fn list_available_dates(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        days_ahead: i32,
    ) -> ServiceResult<Vec<NaiveDate>> {
        self.list_available_dates_at(offering_id, provider_id, days_ahead, Utc::now())
            .await
    }

    /// ## Errors
    /// See [`Self::create_booking_at`].
    pub async fn create_booking(
        &self,
        offering_id: uuid::Uuid,
        provider_id: uuid::Uuid,
        requester_id: uuid::Uuid,
        start_time: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.create_booking_at(offering_id, provider_id, requester_id, start_time, Utc::now())
            .await
    }

    /// ## Errors
    /// See [`Self::confirm_booking_at`].
    pub async fn confirm_booking(&self, id: uuid::Uuid) -> ServiceResult<Booking> {
        self.confirm_booking_at(id, Utc::now()).await
    }

    /// ## Errors
    /// See [`Self::cancel_booking_at`].
    pub async fn cancel_booking(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
    ) -> ServiceResult<Booking> {
        self.cancel_booking_at(id, reason, actor, Utc::now()).await
    }

    /// ## Errors
    /// See [`Self::mark_completed_at`].
    pub async fn mark_completed(&self, id: uuid::Uuid) -> ServiceResult<Booking> {
        self.mark_completed_at(id, Utc::now()).await
    }

    /// ## Errors
    /// See [`Self::mark_no_show_at`].
    pub async fn mark_no_show(&self, id: uuid::Uuid) -> ServiceResult<Booking> {
        self.mark_no_show_at(id, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> (uuid::Uuid, NaiveDate) {
        (
            uuid::Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
        )
    }

    #[test_log::test(tokio::test)]
    async fn released_lock_entries_leave_the_registry() {
        let locks = SlotLocks::default();
        let (provider, date) = key();

        let lock = locks.acquire(provider, date).await;
        drop(lock.lock().await);

        drop(lock);
        locks.release(provider, date).await;
        assert!(locks.inner.lock().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn release_spares_entries_another_task_still_holds() {
        let locks = SlotLocks::default();
        let (provider, date) = key();

        let winner = locks.acquire(provider, date).await;
        let loser = locks.acquire(provider, date).await;

        drop(winner);
        locks.release(provider, date).await;
        assert_eq!(locks.inner.lock().await.len(), 1);

        drop(loser);
        locks.release(provider, date).await;
        assert!(locks.inner.lock().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn registry_does_not_accumulate_across_dates() {
        let locks = SlotLocks::default();
        let provider = uuid::Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        for offset in 0..30 {
            let date = start + TimeDelta::days(offset);
            let lock = locks.acquire(provider, date).await;
            drop(lock.lock().await);
            drop(lock);
            locks.release(provider, date).await;
        }
        assert!(locks.inner.lock().await.is_empty());
    }
}
