//! Back-office management of offerings, weekly rules, and date overrides.
//!
//! These handlers talk to storage directly; the scheduling engine only ever
//! reads this data.

use chrono::{NaiveDate, NaiveTime};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;

use reserva_core::types::DayOfWeek;
use reserva_db::db::query::{availability, offering as offering_query};
use reserva_db::error::DbError;
use reserva_db::model::availability::{NewAvailabilityOverride, NewAvailabilityRule};
use reserva_db::model::offering::NewServiceOffering;

use crate::db_handler::get_db_from_depot;
use crate::error::{ErrorResponse, render_error};

#[derive(Debug, Deserialize)]
struct CreateOfferingRequest {
    name: String,
    duration_minutes: i32,
    #[serde(default)]
    buffer_before_minutes: i32,
    #[serde(default)]
    buffer_after_minutes: i32,
    min_notice_hours: i32,
    max_advance_days: i32,
    max_per_day: Option<i32>,
    #[serde(default)]
    requires_confirmation: bool,
}

#[derive(Debug, Deserialize)]
struct CreateRuleRequest {
    day_of_week: i16,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
struct CreateOverrideRequest {
    date: NaiveDate,
    is_available: bool,
    reason: Option<String>,
}

fn validation(res: &mut Response, message: impl Into<String>) {
    res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
    res.render(Json(ErrorResponse {
        code: "validation",
        error: message.into(),
    }));
}

/// Mirrors the table's CHECK constraints so bad input fails before storage.
fn check_offering(body: &CreateOfferingRequest) -> Result<(), &'static str> {
    if body.name.trim().is_empty() {
        return Err("name must not be empty");
    }
    if body.duration_minutes <= 0 {
        return Err("duration_minutes must be positive");
    }
    if body.buffer_before_minutes < 0 || body.buffer_after_minutes < 0 {
        return Err("buffers must not be negative");
    }
    if body.min_notice_hours < 0 {
        return Err("min_notice_hours must not be negative");
    }
    if body.max_advance_days <= 0 {
        return Err("max_advance_days must be positive");
    }
    if matches!(body.max_per_day, Some(cap) if cap <= 0) {
        return Err("max_per_day must be positive when set");
    }
    Ok(())
}

/// POST /api/offerings
#[handler]
async fn create_offering_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let db = match get_db_from_depot(depot) {
        Ok(db) => db,
        Err(err) => return render_error(res, &err),
    };
    let Ok(body) = req.parse_json::<CreateOfferingRequest>().await else {
        return validation(res, "invalid request body");
    };
    if let Err(message) = check_offering(&body) {
        return validation(res, message);
    }

    let new = NewServiceOffering {
        name: body.name,
        duration_minutes: body.duration_minutes,
        buffer_before_minutes: body.buffer_before_minutes,
        buffer_after_minutes: body.buffer_after_minutes,
        min_notice_hours: body.min_notice_hours,
        max_advance_days: body.max_advance_days,
        max_per_day: body.max_per_day,
        requires_confirmation: body.requires_confirmation,
    };

    let mut conn = match db.get_connection().await {
        Ok(conn) => conn,
        Err(err) => return render_error(res, &err.into()),
    };
    match offering_query::insert(&mut conn, &new).await {
        Ok(offering) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(offering));
        }
        Err(err) => render_error(res, &DbError::from(err).into()),
    }
}

/// POST /api/schedule/{provider_id}/rules
///
/// At most one active rule may exist per (provider, weekday); a duplicate
/// insert maps to 409.
#[handler]
async fn create_rule_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let db = match get_db_from_depot(depot) {
        Ok(db) => db,
        Err(err) => return render_error(res, &err),
    };
    let Some(provider_id) = req.param::<uuid::Uuid>("provider_id") else {
        return validation(res, "missing or malformed provider_id");
    };
    let Ok(body) = req.parse_json::<CreateRuleRequest>().await else {
        return validation(res, "invalid request body");
    };
    if let Err(err) = DayOfWeek::new(body.day_of_week) {
        return validation(res, err.to_string());
    }
    if body.end_time <= body.start_time {
        return validation(res, "end_time must be after start_time");
    }

    let new = NewAvailabilityRule {
        provider_id,
        day_of_week: body.day_of_week,
        start_time: body.start_time,
        end_time: body.end_time,
        active: true,
    };

    let mut conn = match db.get_connection().await {
        Ok(conn) => conn,
        Err(err) => return render_error(res, &err.into()),
    };
    match availability::insert_rule(&mut conn, &new).await {
        Ok(rule) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(rule));
        }
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            res.status_code(StatusCode::CONFLICT);
            res.render(Json(ErrorResponse {
                code: "conflict",
                error: "an active rule already exists for this weekday".to_string(),
            }));
        }
        Err(err) => render_error(res, &DbError::from(err).into()),
    }
}

/// POST /api/schedule/{provider_id}/overrides
#[handler]
async fn create_override_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let db = match get_db_from_depot(depot) {
        Ok(db) => db,
        Err(err) => return render_error(res, &err),
    };
    let Some(provider_id) = req.param::<uuid::Uuid>("provider_id") else {
        return validation(res, "missing or malformed provider_id");
    };
    let Ok(body) = req.parse_json::<CreateOverrideRequest>().await else {
        return validation(res, "invalid request body");
    };

    let new = NewAvailabilityOverride {
        provider_id,
        date: body.date,
        is_available: body.is_available,
        reason: body.reason,
    };

    let mut conn = match db.get_connection().await {
        Ok(conn) => conn,
        Err(err) => return render_error(res, &err.into()),
    };
    match availability::insert_override(&mut conn, &new).await {
        Ok(date_override) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(date_override));
        }
        Err(err) => render_error(res, &DbError::from(err).into()),
    }
}

#[must_use]
pub fn offering_routes() -> Router {
    Router::with_path("offerings").post(create_offering_handler)
}

/// Rules/overrides routes, nested under the schedule router's
/// `{provider_id}` segment.
#[must_use]
pub fn provider_routes() -> Router {
    Router::new()
        .push(Router::with_path("rules").post(create_rule_handler))
        .push(Router::with_path("overrides").post(create_override_handler))
}
