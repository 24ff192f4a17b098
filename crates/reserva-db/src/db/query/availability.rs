//! Queries over weekly availability rules and date overrides.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{availability_override, availability_rule};
use crate::model::availability::{
    AvailabilityOverride, AvailabilityRule, NewAvailabilityOverride, NewAvailabilityRule,
};

/// ## Summary
/// Fetches the active weekly rule for a provider and weekday (0 = Monday),
/// if one exists. A partial unique index guarantees at most one match.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn weekly_rule(
    conn: &mut DbConnection<'_>,
    provider_id: uuid::Uuid,
    day_of_week: i16,
) -> diesel::QueryResult<Option<AvailabilityRule>> {
    availability_rule::table
        .filter(availability_rule::provider_id.eq(provider_id))
        .filter(availability_rule::day_of_week.eq(day_of_week))
        .filter(availability_rule::active.eq(true))
        .select(AvailabilityRule::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Fetches the override for a provider and exact date, if one exists.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn date_override(
    conn: &mut DbConnection<'_>,
    provider_id: uuid::Uuid,
    date: chrono::NaiveDate,
) -> diesel::QueryResult<Option<AvailabilityOverride>> {
    availability_override::table
        .filter(availability_override::provider_id.eq(provider_id))
        .filter(availability_override::date.eq(date))
        .select(AvailabilityOverride::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a new weekly rule and returns the created row.
///
/// ## Errors
/// Returns a database error if the insert fails, including the unique-index
/// violation raised when an active rule already exists for the weekday.
pub async fn insert_rule(
    conn: &mut DbConnection<'_>,
    new: &NewAvailabilityRule,
) -> diesel::QueryResult<AvailabilityRule> {
    diesel::insert_into(availability_rule::table)
        .values(new)
        .returning(AvailabilityRule::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Inserts a new date override and returns the created row.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_override(
    conn: &mut DbConnection<'_>,
    new: &NewAvailabilityOverride,
) -> diesel::QueryResult<AvailabilityOverride> {
    diesel::insert_into(availability_override::table)
        .values(new)
        .returning(AvailabilityOverride::as_returning())
        .get_result(conn)
        .await
}
