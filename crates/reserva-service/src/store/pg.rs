//! PostgreSQL-backed storage adapter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use reserva_core::types::DayOfWeek;
use reserva_db::db::connection::{DbConnection, DbPool};
use reserva_db::db::enums::{BookingStatus, CancelActor};
use reserva_db::db::query::{availability, booking as booking_query, offering as offering_query};
use reserva_db::error::DbError;
use reserva_db::model::availability::{AvailabilityOverride, AvailabilityRule};
use reserva_db::model::booking::{Booking, NewBooking};
use reserva_db::model::offering::ServiceOffering;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{AvailabilityStore, BookingStore};

/// Production storage over the diesel-async connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> ServiceResult<DbConnection<'_>> {
        Ok(self.pool.get().await.map_err(DbError::from)?)
    }
}

#[async_trait]
impl AvailabilityStore for PgStore {
    async fn weekly_rule(
        &self,
        provider_id: uuid::Uuid,
        day_of_week: DayOfWeek,
    ) -> ServiceResult<Option<AvailabilityRule>> {
        let mut conn = self.conn().await?;
        Ok(availability::weekly_rule(&mut conn, provider_id, day_of_week.value())
            .await
            .map_err(DbError::from)?)
    }

    async fn date_override(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Option<AvailabilityOverride>> {
        let mut conn = self.conn().await?;
        Ok(availability::date_override(&mut conn, provider_id, date)
            .await
            .map_err(DbError::from)?)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn offering(&self, id: uuid::Uuid) -> ServiceResult<Option<ServiceOffering>> {
        let mut conn = self.conn().await?;
        Ok(offering_query::by_id(&mut conn, id)
            .await
            .map_err(DbError::from)?)
    }

    async fn booking(&self, id: uuid::Uuid) -> ServiceResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::by_id(&mut conn, id)
            .await
            .map_err(DbError::from)?)
    }

    async fn active_on_date(
        &self,
        provider_id: uuid::Uuid,
        date: NaiveDate,
    ) -> ServiceResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::active_on_date(&mut conn, provider_id, date)
            .await
            .map_err(DbError::from)?)
    }

    async fn insert(&self, new: NewBooking) -> ServiceResult<Booking> {
        let mut conn = self.conn().await?;
        match booking_query::insert(&mut conn, &new).await {
            Ok(created) => Ok(created),
            Err(err) if booking_query::is_overlap_violation(&err) => {
                Err(ServiceError::Conflict(
                    "slot was taken by a concurrent booking".to_string(),
                ))
            }
            Err(err) => Err(DbError::from(err).into()),
        }
    }

    async fn confirm(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::confirm(&mut conn, id, now)
            .await
            .map_err(DbError::from)?)
    }

    async fn cancel(
        &self,
        id: uuid::Uuid,
        reason: Option<String>,
        actor: CancelActor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::cancel(&mut conn, id, reason.as_deref(), actor, now)
            .await
            .map_err(DbError::from)?)
    }

    async fn finish(
        &self,
        id: uuid::Uuid,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::finish(&mut conn, id, to, now)
            .await
            .map_err(DbError::from)?)
    }

    async fn set_external_refs(
        &self,
        id: uuid::Uuid,
        external_event_ref: Option<String>,
        external_meeting_ref: Option<String>,
    ) -> ServiceResult<()> {
        // An all-None changeset is a diesel error, not a no-op.
        if external_event_ref.is_none() && external_meeting_ref.is_none() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        booking_query::set_external_refs(&mut conn, id, external_event_ref, external_meeting_ref)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ServiceResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::due_reminders(&mut conn, now, until)
            .await
            .map_err(DbError::from)?)
    }

    async fn mark_reminder_sent(
        &self,
        id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        Ok(booking_query::mark_reminder_sent(&mut conn, id, now)
            .await
            .map_err(DbError::from)?)
    }
}
