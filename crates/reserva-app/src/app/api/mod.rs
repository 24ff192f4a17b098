mod admin;
mod booking;
mod healthcheck;
mod schedule;

use salvo::Router;

// Re-export route constants from core
pub use reserva_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, BOOKING_ROUTE_COMPONENT, BOOKING_ROUTE_PREFIX,
    SCHEDULE_ROUTE_COMPONENT, SCHEDULE_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router with the schedule and booking surfaces.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(Router::with_path("app").push(healthcheck::routes()))
        .push(admin::offering_routes())
        .push(schedule::routes())
        .push(booking::routes())
}
