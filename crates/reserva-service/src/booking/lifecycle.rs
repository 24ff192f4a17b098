//! The booking state machine.
//!
//! Transitions are a closed set: `pending -> confirmed`,
//! `pending|confirmed -> cancelled` (eligibility-guarded), and
//! `confirmed -> completed|no_show` once the booking has ended. Terminal
//! states admit nothing further. Store transitions are compare-and-swap
//! shaped, so of two concurrent confirms exactly one observes `pending` and
//! wins; the other gets a state error, never a corrupt row.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use reserva_db::db::enums::{BookingStatus, CancelActor};
use reserva_db::model::booking::Booking;

use crate::collaborator::Collaborators;
use crate::error::{ServiceError, ServiceResult};
use crate::store::BookingStore;

/// ## Summary
/// Whether a booking may still be cancelled: it must be active, and `now`
/// plus the notice period must fall strictly before the booking's start.
#[must_use]
pub fn can_cancel(booking: &Booking, now: DateTime<Utc>, notice: TimeDelta) -> bool {
    booking.status.is_active() && now + notice < booking.start_time
}

/// Reschedule eligibility is the identical predicate; rescheduling is
/// modelled as cancel-then-recreate at the caller level.
#[must_use]
pub fn can_reschedule(booking: &Booking, now: DateTime<Utc>, notice: TimeDelta) -> bool {
    can_cancel(booking, now, notice)
}

/// Owns the booking state machine and the post-transition side effects.
pub struct BookingLifecycleManager {
    store: Arc<dyn BookingStore>,
    collaborators: Arc<Collaborators>,
    cancellation_notice: TimeDelta,
}

impl BookingLifecycleManager {
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        collaborators: Arc<Collaborators>,
        cancellation_notice: TimeDelta,
    ) -> Self {
        Self {
            store,
            collaborators,
            cancellation_notice,
        }
    }

    async fn require(&self, id: uuid::Uuid) -> ServiceResult<Booking> {
        self.store
            .booking(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("booking {id}")))
    }

    /// ## Summary
    /// `pending -> confirmed`. Emits the confirmation side effects only
    /// after the transition has been persisted.
    ///
    /// ## Errors
    /// `NotFound` for an unknown id; `State` when the booking is not pending.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(&self, id: uuid::Uuid, now: DateTime<Utc>) -> ServiceResult<Booking> {
        let Some(updated) = self.store.confirm(id, now).await? else {
            let status = self.require(id).await?.status;
            return Err(ServiceError::State(format!(
                "cannot confirm a {status} booking"
            )));
        };

        tracing::info!(booking_id = %updated.id, "Booking confirmed");
        self.emit_confirmed(&updated).await;
        Ok(updated)
    }

    /// ## Summary
    /// `pending|confirmed -> cancelled`, guarded by the eligibility policy.
    ///
    /// ## Errors
    /// `NotFound` for an unknown id; `State` when the booking is terminal or
    /// inside the cancellation notice window.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        let current = self.require(id).await?;
        if !current.status.is_active() {
            return Err(ServiceError::State(format!(
                "cannot cancel a {} booking",
                current.status
            )));
        }
        if !can_cancel(&current, now, self.cancellation_notice) {
            return Err(ServiceError::State(format!(
                "cancellation requires at least {}h notice",
                self.cancellation_notice.num_hours()
            )));
        }

        let Some(updated) = self.store.cancel(id, reason, actor, now).await? else {
            // Lost the race against a concurrent transition.
            let status = self.require(id).await?.status;
            return Err(ServiceError::State(format!(
                "cannot cancel a {status} booking"
            )));
        };

        tracing::info!(booking_id = %updated.id, actor = %actor, "Booking cancelled");
        self.collaborators.notify_cancelled(&updated).await;
        self.collaborators.delete_event(&updated).await;
        self.collaborators.delete_meeting(&updated).await;
        Ok(updated)
    }

    /// ## Summary
    /// `confirmed -> completed`, allowed once the booking has ended.
    ///
    /// ## Errors
    /// `NotFound`, or `State` if not confirmed or not yet ended.
    pub async fn mark_completed(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.finish(id, BookingStatus::Completed, now).await
    }

    /// ## Summary
    /// `confirmed -> no_show`, allowed once the booking has ended.
    ///
    /// ## Errors
    /// `NotFound`, or `State` if not confirmed or not yet ended.
    pub async fn mark_no_show(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        self.finish(id, BookingStatus::NoShow, now).await
    }

    async fn finish(
        &self,
        id: uuid::Uuid,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<Booking> {
        let current = self.require(id).await?;
        if now < current.end_time {
            return Err(ServiceError::State(format!(
                "cannot mark a booking {to} before it has ended"
            )));
        }

        let Some(updated) = self.store.finish(id, to, now).await? else {
            return Err(ServiceError::State(format!(
                "cannot mark a {} booking {to}",
                current.status
            )));
        };

        tracing::info!(booking_id = %updated.id, status = %to, "Booking closed out");
        Ok(updated)
    }

    /// Post-commit side effects of a confirmation: notify, provision the
    /// external event/meeting, and record their references. All best-effort.
    pub(crate) async fn emit_confirmed(&self, booking: &Booking) {
        self.collaborators.notify_confirmed(booking).await;

        let event_ref = self.collaborators.create_event(booking).await;
        let meeting_ref = self.collaborators.create_meeting(booking).await;
        if (event_ref.is_some() || meeting_ref.is_some())
            && let Err(err) = self
                .store
                .set_external_refs(booking.id, event_ref, meeting_ref)
                .await
        {
            tracing::warn!(booking_id = %booking.id, error = %err, "Failed to record collaborator references");
        }
    }
}
