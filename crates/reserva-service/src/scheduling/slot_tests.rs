//! Unit tests for candidate slot generation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use reserva_core::types::DayOfWeek;
use reserva_db::model::availability::{AvailabilityOverride, AvailabilityRule};

use crate::error::ServiceResult;
use crate::scheduling::fixtures;
use crate::scheduling::slot::{SlotGenerator, beyond_horizon, candidate_starts};
use crate::store::AvailabilityStore;

/// Availability stub returning a fixed rule/override for any lookup.
struct FixedAvailability {
    rule: Option<AvailabilityRule>,
    date_override: Option<AvailabilityOverride>,
}

#[async_trait]
impl AvailabilityStore for FixedAvailability {
    async fn weekly_rule(
        &self,
        _provider_id: uuid::Uuid,
        _day_of_week: DayOfWeek,
    ) -> ServiceResult<Option<AvailabilityRule>> {
        Ok(self.rule.clone())
    }

    async fn date_override(
        &self,
        _provider_id: uuid::Uuid,
        _date: NaiveDate,
    ) -> ServiceResult<Option<AvailabilityOverride>> {
        Ok(self.date_override.clone())
    }
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2026-08-24 is a Monday; the preceding Friday is 2026-08-21.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
}

fn friday_9am() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2026, 8, 21)
        .unwrap()
        .and_time(time(9, 0))
        .and_utc()
}

fn monday_rule(provider_id: uuid::Uuid) -> AvailabilityRule {
    let now = Utc::now();
    AvailabilityRule {
        id: uuid::Uuid::new_v4(),
        provider_id,
        day_of_week: 0,
        start_time: time(9, 0),
        end_time: time(17, 0),
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn generator(
    rule: Option<AvailabilityRule>,
    date_override: Option<AvailabilityOverride>,
) -> SlotGenerator {
    SlotGenerator::new(Arc::new(FixedAvailability {
        rule,
        date_override,
    }))
}

#[tokio::test]
async fn monday_grid_with_60min_duration_and_15min_buffer() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();

    let expected: Vec<DateTime<Utc>> = [(9, 0), (10, 15), (11, 30), (12, 45), (14, 0), (15, 15)]
        .iter()
        .map(|&(h, m)| monday().and_time(time(h, m)).and_utc())
        .collect();
    assert_eq!(slots, expected);
}

#[tokio::test]
async fn slots_are_at_least_duration_apart() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();

    for pair in slots.windows(2) {
        assert!(pair[1] - pair[0] >= offering.duration());
    }
}

#[tokio::test]
async fn date_beyond_horizon_is_empty() {
    let provider = uuid::Uuid::new_v4();
    let mut offering = fixtures::offering(60, 15);
    offering.max_advance_days = 2;
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn date_entirely_inside_notice_window_is_empty() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    // Asking for the Friday itself with 24h notice: every slot is too soon.
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(
            &offering,
            provider,
            friday_9am().date_naive(),
            friday_9am(),
        )
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn boundary_day_keeps_only_slots_strictly_after_notice() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    // Sunday 10:30 + 24h notice = Monday 10:30; 09:00 and 10:15 are gone.
    let sunday_1030 = NaiveDate::from_ymd_opt(2026, 8, 23)
        .unwrap()
        .and_time(time(10, 30))
        .and_utc();
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(&offering, provider, monday(), sunday_1030)
        .await
        .unwrap();

    let expected: Vec<DateTime<Utc>> = [(11, 30), (12, 45), (14, 0), (15, 15)]
        .iter()
        .map(|&(h, m)| monday().and_time(time(h, m)).and_utc())
        .collect();
    assert_eq!(slots, expected);
}

#[tokio::test]
async fn slot_exactly_at_notice_boundary_is_excluded() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    // Sunday 09:00 + 24h = Monday 09:00 exactly; notice must be strictly met.
    let sunday_9am = NaiveDate::from_ymd_opt(2026, 8, 23)
        .unwrap()
        .and_time(time(9, 0))
        .and_utc();
    let slots = generator(Some(monday_rule(provider)), None)
        .generate(&offering, provider, monday(), sunday_9am)
        .await
        .unwrap();

    assert!(!slots.contains(&monday().and_time(time(9, 0)).and_utc()));
    assert_eq!(slots.first(), Some(&monday().and_time(time(10, 15)).and_utc()));
}

#[tokio::test]
async fn blocking_override_empties_the_date() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let blocked = AvailabilityOverride {
        id: uuid::Uuid::new_v4(),
        provider_id: provider,
        date: monday(),
        is_available: false,
        reason: Some("public holiday".to_string()),
        created_at: Utc::now(),
    };
    let slots = generator(Some(monday_rule(provider)), Some(blocked))
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn lifting_override_keeps_weekly_hours() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let lifted = AvailabilityOverride {
        id: uuid::Uuid::new_v4(),
        provider_id: provider,
        date: monday(),
        is_available: true,
        reason: None,
        created_at: Utc::now(),
    };
    let slots = generator(Some(monday_rule(provider)), Some(lifted))
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();
    assert_eq!(slots.len(), 6);
}

#[tokio::test]
async fn no_weekly_rule_means_closed() {
    let provider = uuid::Uuid::new_v4();
    let offering = fixtures::offering(60, 15);
    let slots = generator(None, None)
        .generate(&offering, provider, monday(), friday_9am())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[test]
fn trailing_candidate_must_fit_in_window() {
    // 15:15 + 60min = 16:15 fits; the next step 16:30 + 60min = 17:30 does not.
    let slots = candidate_starts(monday(), time(9, 0), time(17, 0), 60, 15);
    assert_eq!(slots.last(), Some(&monday().and_time(time(15, 15)).and_utc()));
    assert_eq!(slots.len(), 6);
}

#[test]
fn window_exactly_one_duration_long_yields_one_slot() {
    let slots = candidate_starts(monday(), time(9, 0), time(10, 0), 60, 15);
    assert_eq!(slots, vec![monday().and_time(time(9, 0)).and_utc()]);
}

#[test]
fn window_shorter_than_duration_yields_nothing() {
    let slots = candidate_starts(monday(), time(9, 0), time(9, 59), 60, 0);
    assert!(slots.is_empty());
}

#[test]
fn degenerate_inputs_yield_nothing() {
    assert!(candidate_starts(monday(), time(9, 0), time(9, 0), 60, 0).is_empty());
    assert!(candidate_starts(monday(), time(10, 0), time(9, 0), 60, 0).is_empty());
    assert!(candidate_starts(monday(), time(9, 0), time(17, 0), 0, 0).is_empty());
}

#[test]
fn horizon_is_inclusive_of_the_last_day() {
    let now = friday_9am();
    assert!(!beyond_horizon(now.date_naive() + chrono::TimeDelta::days(30), now, 30));
    assert!(beyond_horizon(now.date_naive() + chrono::TimeDelta::days(31), now, 30));
}
