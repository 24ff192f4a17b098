use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A bookable service definition: duration, buffers, notice/advance/capacity
/// rules. Immutable per booking once referenced — bookings copy the derived
/// end time and both buffers at creation, so later offering edits never
/// rewrite held slots.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::service_offering)]
#[diesel(check_for_backend(Pg))]
pub struct ServiceOffering {
    pub id: uuid::Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_before_minutes: i32,
    pub buffer_after_minutes: i32,
    pub min_notice_hours: i32,
    pub max_advance_days: i32,
    /// `None` means unbounded.
    pub max_per_day: Option<i32>,
    pub requires_confirmation: bool,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ServiceOffering {
    #[must_use]
    pub fn duration(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::minutes(i64::from(self.duration_minutes))
    }

    #[must_use]
    pub fn min_notice(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::hours(i64::from(self.min_notice_hours))
    }
}

/// Insert struct for creating new offerings
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::service_offering)]
pub struct NewServiceOffering {
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_before_minutes: i32,
    pub buffer_after_minutes: i32,
    pub min_notice_hours: i32,
    pub max_advance_days: i32,
    pub max_per_day: Option<i32>,
    pub requires_confirmation: bool,
}
