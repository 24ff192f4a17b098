//! Builders shared by the integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};

use reserva_db::model::availability::{AvailabilityOverride, AvailabilityRule};
use reserva_db::model::offering::ServiceOffering;
use reserva_service::booking::service::BookingService;
use reserva_service::collaborator::{Collaborators, Notifier};

use crate::memory::MemoryStore;
use crate::recording::RecordingNotifier;

/// A 60-minute auto-confirmed offering with a 15-minute trailing buffer,
/// 24h notice, 30-day horizon, and a cap of 5 per day. Tests mutate fields
/// for the variant they need.
#[must_use]
pub fn offering() -> ServiceOffering {
    let now = Utc::now();
    ServiceOffering {
        id: uuid::Uuid::new_v4(),
        name: "Consultation".to_string(),
        duration_minutes: 60,
        buffer_before_minutes: 0,
        buffer_after_minutes: 15,
        min_notice_hours: 24,
        max_advance_days: 30,
        max_per_day: Some(5),
        requires_confirmation: false,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

#[must_use]
pub fn weekly_rule(
    provider_id: uuid::Uuid,
    day_of_week: i16,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> AvailabilityRule {
    let now = Utc::now();
    AvailabilityRule {
        id: uuid::Uuid::new_v4(),
        provider_id,
        day_of_week,
        start_time,
        end_time,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

#[must_use]
pub fn date_override(
    provider_id: uuid::Uuid,
    date: NaiveDate,
    is_available: bool,
) -> AvailabilityOverride {
    AvailabilityOverride {
        id: uuid::Uuid::new_v4(),
        provider_id,
        date,
        is_available,
        reason: None,
        created_at: Utc::now(),
    }
}

/// A recording-notifier-only collaborator set.
#[must_use]
pub fn collaborators(notifier: &Arc<RecordingNotifier>) -> Arc<Collaborators> {
    Arc::new(Collaborators {
        notifier: Arc::clone(notifier) as Arc<dyn Notifier>,
        calendar: None,
        meeting: None,
        sync_timeout: Duration::from_secs(2),
    })
}

/// A booking service over the in-memory store with a recording notifier and
/// the default 24h cancellation policy.
#[must_use]
pub fn engine(store: &Arc<MemoryStore>, notifier: &Arc<RecordingNotifier>) -> BookingService {
    BookingService::new(
        Arc::clone(store) as _,
        Arc::clone(store) as _,
        collaborators(notifier),
        TimeDelta::hours(24),
    )
}
