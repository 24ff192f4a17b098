//! Queries over service offerings.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::service_offering;
use crate::model::offering::{NewServiceOffering, ServiceOffering};

/// ## Summary
/// Fetches an offering by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> diesel::QueryResult<Option<ServiceOffering>> {
    service_offering::table
        .find(id)
        .select(ServiceOffering::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a new offering and returns the created row.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new: &NewServiceOffering,
) -> diesel::QueryResult<ServiceOffering> {
    diesel::insert_into(service_offering::table)
        .values(new)
        .returning(ServiceOffering::as_returning())
        .get_result(conn)
        .await
}
