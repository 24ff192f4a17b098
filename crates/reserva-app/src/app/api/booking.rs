//! Booking creation and lifecycle endpoints.

use chrono::{DateTime, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;

use reserva_core::constants::BOOKING_ROUTE_COMPONENT;
use reserva_db::db::enums::CancelActor;

use crate::error::{ErrorResponse, render_error};
use crate::service_handler::get_service_from_depot;

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    offering_id: uuid::Uuid,
    provider_id: uuid::Uuid,
    requester_id: uuid::Uuid,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Default)]
struct CancelBookingRequest {
    reason: Option<String>,
    actor: Option<CancelActor>,
}

fn invalid_body(res: &mut Response) {
    res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
    res.render(Json(ErrorResponse {
        code: "validation",
        error: "invalid request body".to_string(),
    }));
}

fn missing_id(res: &mut Response) {
    res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
    res.render(Json(ErrorResponse {
        code: "validation",
        error: "missing or malformed booking id".to_string(),
    }));
}

/// ## Summary
/// POST /api/bookings — creates a booking at the requested start time.
///
/// ## Errors
/// 422 for a start time outside the notice/advance/working-hours windows,
/// 409 when the slot or daily cap was lost to another booking, 404 for an
/// unknown offering.
#[handler]
async fn create_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Ok(body) = req.parse_json::<CreateBookingRequest>().await else {
        return invalid_body(res);
    };

    match service
        .create_booking(
            body.offering_id,
            body.provider_id,
            body.requester_id,
            body.start_time,
        )
        .await
    {
        Ok(booking) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(booking));
        }
        Err(err) => render_error(res, &err.into()),
    }
}

/// GET /api/bookings/{id}
#[handler]
async fn get_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(id) = req.param::<uuid::Uuid>("id") else {
        return missing_id(res);
    };

    match service.booking(id).await {
        Ok(booking) => res.render(Json(booking)),
        Err(err) => render_error(res, &err.into()),
    }
}

/// POST /api/bookings/{id}/confirm
#[handler]
async fn confirm_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(id) = req.param::<uuid::Uuid>("id") else {
        return missing_id(res);
    };

    match service.confirm_booking(id).await {
        Ok(booking) => res.render(Json(booking)),
        Err(err) => render_error(res, &err.into()),
    }
}

/// POST /api/bookings/{id}/cancel — body `{reason?, actor?}`, actor defaults
/// to `requester`.
#[handler]
async fn cancel_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(id) = req.param::<uuid::Uuid>("id") else {
        return missing_id(res);
    };
    // An empty body is a plain requester cancellation.
    let body = req
        .parse_json::<CancelBookingRequest>()
        .await
        .unwrap_or_default();
    let actor = body.actor.unwrap_or(CancelActor::Requester);

    match service.cancel_booking(id, body.reason, actor).await {
        Ok(booking) => res.render(Json(booking)),
        Err(err) => render_error(res, &err.into()),
    }
}

/// POST /api/bookings/{id}/complete — operator marking after the end time.
#[handler]
async fn complete_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(id) = req.param::<uuid::Uuid>("id") else {
        return missing_id(res);
    };

    match service.mark_completed(id).await {
        Ok(booking) => res.render(Json(booking)),
        Err(err) => render_error(res, &err.into()),
    }
}

/// POST /api/bookings/{id}/no-show — operator marking after the end time.
#[handler]
async fn no_show_booking_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let service = match get_service_from_depot(depot) {
        Ok(service) => service,
        Err(err) => return render_error(res, &err),
    };
    let Some(id) = req.param::<uuid::Uuid>("id") else {
        return missing_id(res);
    };

    match service.mark_no_show(id).await {
        Ok(booking) => res.render(Json(booking)),
        Err(err) => render_error(res, &err.into()),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(BOOKING_ROUTE_COMPONENT)
        .post(create_booking_handler)
        .push(Router::with_path("{id}").get(get_booking_handler))
        .push(Router::with_path("{id}/confirm").post(confirm_booking_handler))
        .push(Router::with_path("{id}/cancel").post(cancel_booking_handler))
        .push(Router::with_path("{id}/complete").post(complete_booking_handler))
        .push(Router::with_path("{id}/no-show").post(no_show_booking_handler))
}
