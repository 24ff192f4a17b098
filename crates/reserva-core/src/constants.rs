/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const SCHEDULE_ROUTE_COMPONENT: &str = "schedule";
pub const SCHEDULE_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SCHEDULE_ROUTE_COMPONENT);

pub const BOOKING_ROUTE_COMPONENT: &str = "bookings";
pub const BOOKING_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", BOOKING_ROUTE_COMPONENT);

/// Default cancellation/reschedule notice, in hours. Call sites may pass a
/// stricter value; this is only the fallback when config omits it.
pub const DEFAULT_CANCELLATION_NOTICE_HOURS: i64 = 24;
