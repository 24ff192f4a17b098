//! Queries and guarded status transitions over bookings.
//!
//! Transition functions are conditional `UPDATE ... WHERE status = ...`
//! statements returning the updated row. `Ok(None)` means the guard did not
//! match (somebody else won the transition); callers map that to a state
//! error without a read-modify-write race.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::{BookingStatus, CancelActor};
use crate::db::schema::booking;
use crate::model::booking::{Booking, NewBooking};

/// Name of the exclusion constraint guarding overlapping active bookings.
pub const OVERLAP_CONSTRAINT: &str = "booking_no_overlap";

const ACTIVE_STATUSES: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

/// ## Summary
/// Fetches a booking by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<Booking>> {
    booking::table
        .find(id)
        .select(Booking::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads the active (pending or confirmed) bookings of a provider whose start
/// falls on the given calendar date, ascending by start time.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn active_on_date(
    conn: &mut DbConnection<'_>,
    provider_id: uuid::Uuid,
    date: chrono::NaiveDate,
) -> diesel::QueryResult<Vec<Booking>> {
    let day_start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + chrono::TimeDelta::days(1);

    booking::table
        .filter(booking::provider_id.eq(provider_id))
        .filter(booking::status.eq_any(ACTIVE_STATUSES))
        .filter(booking::start_time.ge(day_start))
        .filter(booking::start_time.lt(day_end))
        .order(booking::start_time.asc())
        .select(Booking::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a new booking and returns the created row.
///
/// The `booking_no_overlap` exclusion constraint makes this insert the
/// serialization point for concurrent writers; use [`is_overlap_violation`]
/// to distinguish a lost race from other database failures.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new: &NewBooking,
) -> diesel::QueryResult<Booking> {
    diesel::insert_into(booking::table)
        .values(new)
        .returning(Booking::as_returning())
        .get_result(conn)
        .await
}

/// Whether a database error is the overlap exclusion constraint firing.
#[must_use]
pub fn is_overlap_violation(err: &diesel::result::Error) -> bool {
    match err {
        diesel::result::Error::DatabaseError(_, info) => {
            info.constraint_name() == Some(OVERLAP_CONSTRAINT)
        }
        _ => false,
    }
}

/// ## Summary
/// Transitions a pending booking to confirmed.
///
/// Returns `Ok(None)` if the booking does not exist or is not pending.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn confirm(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Option<Booking>> {
    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq(BookingStatus::Pending)),
    )
    .set((
        booking::status.eq(BookingStatus::Confirmed),
        booking::updated_at.eq(now),
    ))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Transitions an active booking to cancelled, recording reason, actor, and
/// timestamp. Returns `Ok(None)` if the booking is missing or not active.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn cancel(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    reason: Option<&str>,
    actor: CancelActor,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Option<Booking>> {
    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq_any(ACTIVE_STATUSES)),
    )
    .set((
        booking::status.eq(BookingStatus::Cancelled),
        booking::cancellation_reason.eq(reason),
        booking::cancelled_at.eq(now),
        booking::cancelled_by.eq(actor),
        booking::updated_at.eq(now),
    ))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Transitions a confirmed booking to a terminal historical state
/// (`completed` or `no_show`). Returns `Ok(None)` if the booking is missing
/// or not confirmed.
///
/// ## Errors
/// Returns a database error if the update fails, or an invariant violation
/// if `to` is not a terminal historical state.
pub async fn finish(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    to: BookingStatus,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Option<Booking>> {
    debug_assert!(matches!(
        to,
        BookingStatus::Completed | BookingStatus::NoShow
    ));

    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq(BookingStatus::Confirmed)),
    )
    .set((booking::status.eq(to), booking::updated_at.eq(now)))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Records opaque references handed back by the calendar/meeting
/// collaborators. `None` fields are left untouched.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn set_external_refs(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    external_event_ref: Option<String>,
    external_meeting_ref: Option<String>,
) -> diesel::QueryResult<usize> {
    #[derive(AsChangeset)]
    #[diesel(table_name = booking)]
    struct RefsChangeset {
        external_event_ref: Option<String>,
        external_meeting_ref: Option<String>,
    }

    diesel::update(booking::table.find(id))
        .set(RefsChangeset {
            external_event_ref,
            external_meeting_ref,
        })
        .execute(conn)
        .await
}

/// ## Summary
/// Loads confirmed bookings starting in `(now, until]` that have not been
/// reminded yet, ascending by start time.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn due_reminders(
    conn: &mut DbConnection<'_>,
    now: chrono::DateTime<chrono::Utc>,
    until: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Vec<Booking>> {
    booking::table
        .filter(booking::status.eq(BookingStatus::Confirmed))
        .filter(booking::reminder_sent_at.is_null())
        .filter(booking::start_time.gt(now))
        .filter(booking::start_time.le(until))
        .order(booking::start_time.asc())
        .select(Booking::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Stamps `reminder_sent_at`, but only if it is still unset and the booking
/// is still confirmed. Returns `Ok(None)` when another process already
/// claimed the reminder — the caller must then skip sending.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn mark_reminder_sent(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Option<Booking>> {
    diesel::update(
        booking::table
            .filter(booking::id.eq(id))
            .filter(booking::status.eq(BookingStatus::Confirmed))
            .filter(booking::reminder_sent_at.is_null()),
    )
    .set((
        booking::reminder_sent_at.eq(now),
        booking::updated_at.eq(now),
    ))
    .returning(Booking::as_returning())
    .get_result(conn)
    .await
    .optional()
}
