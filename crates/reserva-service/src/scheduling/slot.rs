//! Candidate slot generation for an (offering, provider, date) triple.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use reserva_core::types::DayOfWeek;
use reserva_db::model::offering::ServiceOffering;

use crate::error::ServiceResult;
use crate::store::AvailabilityStore;

/// Produces the theoretically valid start times within a provider's open
/// hours for a date, before conflict resolution.
pub struct SlotGenerator {
    availability: Arc<dyn AvailabilityStore>,
}

impl SlotGenerator {
    #[must_use]
    pub fn new(availability: Arc<dyn AvailabilityStore>) -> Self {
        Self { availability }
    }

    /// ## Summary
    /// Generates the ascending candidate start times on `date`, applying the
    /// notice, advance-horizon, override, and weekly-window constraints.
    ///
    /// Stepping rule: candidates advance from the window start in increments
    /// of `duration + buffer_after`; the trailing candidate is included iff
    /// its occupied span `[c, c + duration]` still fits inside the window.
    ///
    /// ## Errors
    /// Propagates storage failures from the availability lookups.
    #[tracing::instrument(skip(self, offering), fields(offering_id = %offering.id))]
    pub async fn generate(
        &self,
        offering: &ServiceOffering,
        provider_id: uuid::Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<DateTime<Utc>>> {
        let earliest_bookable = now + offering.min_notice();

        // Every slot on a date before the earliest bookable calendar date
        // would start too soon; the boundary date is filtered per slot below.
        if date < earliest_bookable.date_naive() {
            tracing::trace!("Date closed for notice");
            return Ok(Vec::new());
        }

        if beyond_horizon(date, now, offering.max_advance_days) {
            tracing::trace!("Date beyond booking horizon");
            return Ok(Vec::new());
        }

        if let Some(date_override) = self
            .availability
            .date_override(provider_id, date)
            .await?
            && !date_override.is_available
        {
            tracing::trace!(reason = ?date_override.reason, "Date blocked by override");
            return Ok(Vec::new());
        }

        let Some(rule) = self
            .availability
            .weekly_rule(provider_id, DayOfWeek::of(date))
            .await?
        else {
            tracing::trace!("No weekly rule for weekday");
            return Ok(Vec::new());
        };

        let candidates = candidate_starts(
            date,
            rule.start_time,
            rule.end_time,
            offering.duration_minutes,
            offering.buffer_after_minutes,
        );

        Ok(candidates
            .into_iter()
            .filter(|candidate| *candidate > earliest_bookable)
            .collect())
    }
}

/// Whether `date` lies past the offering's advance-booking horizon.
#[must_use]
pub fn beyond_horizon(date: NaiveDate, now: DateTime<Utc>, max_advance_days: i32) -> bool {
    date > now.date_naive() + TimeDelta::days(i64::from(max_advance_days))
}

/// ## Summary
/// Steps through the working window `[window_start, window_end]` on `date`
/// in increments of `duration + buffer_after` minutes, keeping every
/// candidate whose occupied span `[c, c + duration]` fits in the window.
///
/// The window is assumed to lie entirely within one calendar date.
#[must_use]
pub fn candidate_starts(
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
    duration_minutes: i32,
    buffer_after_minutes: i32,
) -> Vec<DateTime<Utc>> {
    if duration_minutes <= 0 || buffer_after_minutes < 0 || window_end <= window_start {
        return Vec::new();
    }

    let duration = TimeDelta::minutes(i64::from(duration_minutes));
    let step = duration + TimeDelta::minutes(i64::from(buffer_after_minutes));

    let window_end = date.and_time(window_end).and_utc();
    let mut candidate = date.and_time(window_start).and_utc();

    let mut slots = Vec::new();
    while candidate + duration <= window_end {
        slots.push(candidate);
        candidate += step;
    }
    slots
}
