use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// Recurring weekly open-hours window for a provider.
///
/// `day_of_week` is 0 = Monday .. 6 = Sunday; at most one active rule exists
/// per (provider, weekday). The window never crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::availability_rule)]
#[diesel(check_for_backend(Pg))]
pub struct AvailabilityRule {
    pub id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub day_of_week: i16,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new weekly rules
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::availability_rule)]
pub struct NewAvailabilityRule {
    pub provider_id: uuid::Uuid,
    pub day_of_week: i16,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub active: bool,
}

/// Date-specific exception to the weekly rules.
///
/// `is_available == false` blocks the whole date. `is_available == true`
/// only lifts a block; the weekly rule still defines the hours.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::availability_override)]
#[diesel(check_for_backend(Pg))]
pub struct AvailabilityOverride {
    pub id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for creating new overrides
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::availability_override)]
pub struct NewAvailabilityOverride {
    pub provider_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
}
