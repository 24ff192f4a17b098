//! Availability queries: bookable dates and per-date slot listings.

use chrono::{DateTime, NaiveDate, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;

use reserva_core::constants::SCHEDULE_ROUTE_COMPONENT;

use crate::error::{ErrorResponse, render_error};
use crate::service_handler::get_service_from_depot;

#[derive(Debug, Serialize)]
struct DatesResponse {
    dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct SlotsResponse {
    date: NaiveDate,
    slots: Vec<DateTime<Utc>>,
}

fn missing_param(res: &mut Response, name: &str) {
    res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
    res.render(Json(ErrorResponse {
        code: "validation",
        error: format!("missing or malformed {name}"),
    }));
}

/// ## Summary
/// GET /api/schedule/{provider_id}/{offering_id}/dates?days_ahead=N
///
/// The dates within the next `days_ahead` days (default 30, clamped to the
/// offering's advance horizon) with at least one bookable slot.
#[handler]
async fn list_dates_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(provider_id) = req.param::<uuid::Uuid>("provider_id") else {
        return missing_param(res, "provider_id");
    };
    let Some(offering_id) = req.param::<uuid::Uuid>("offering_id") else {
        return missing_param(res, "offering_id");
    };
    let days_ahead = req.query::<i32>("days_ahead").unwrap_or(30);

    match service
        .list_available_dates(offering_id, provider_id, days_ahead)
        .await
    {
        Ok(dates) => res.render(Json(DatesResponse { dates })),
        Err(err) => render_error(res, &err.into()),
    }
}

/// ## Summary
/// GET /api/schedule/{provider_id}/{offering_id}/slots?date=YYYY-MM-DD
///
/// The bookable start times on the date, after conflict resolution.
#[handler]
async fn list_slots_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(provider_id) = req.param::<uuid::Uuid>("provider_id") else {
        return missing_param(res, "provider_id");
    };
    let Some(offering_id) = req.param::<uuid::Uuid>("offering_id") else {
        return missing_param(res, "offering_id");
    };
    let Some(date) = req.query::<NaiveDate>("date") else {
        return missing_param(res, "date");
    };

    match service
        .list_available_slots(offering_id, provider_id, date)
        .await
    {
        Ok(slots) => res.render(Json(SlotsResponse { date, slots })),
        Err(err) => render_error(res, &err.into()),
    }
}

#[must_use]
pub fn routes() -> Router {
    // The literal rules/overrides segments must register before the
    // `{offering_id}` wildcard.
    Router::with_path(SCHEDULE_ROUTE_COMPONENT).push(
        Router::with_path("{provider_id}")
            .push(super::admin::provider_routes())
            .push(
                Router::with_path("{offering_id}")
                    .push(Router::with_path("dates").get(list_dates_handler))
                    .push(Router::with_path("slots").get(list_slots_handler)),
            ),
    )
}
