use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use reserva_core::config::DatabaseConfig;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// ## Summary
/// Builds the engine's connection pool from the `database` settings section.
/// Connections are created lazily up to `max_connections`; a checkout that
/// cannot be served within [`CHECKOUT_TIMEOUT`] fails instead of queueing
/// a booking request indefinitely.
///
/// ## Errors
/// Returns an error when the pool cannot be built from the configured URL.
#[tracing::instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());

    let pool = Pool::builder()
        .max_size(u32::from(config.max_connections))
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Booking database pool ready"
    );

    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move {
            let conn = self.get().await?;
            Ok(conn)
        })
    }
}
