use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use reserva_core::error::CoreError;
use reserva_db::db::DbProvider;

/// Injects the connection pool into every request's depot for handlers that
/// talk to storage directly (the back-office admin surface).
///
/// The provider is wrapped once at construction; requests share the same
/// `Arc` rather than cloning the pool per request.
pub struct DbProviderHandler {
    provider: Arc<dyn DbProvider + Send + Sync>,
}

impl DbProviderHandler {
    pub fn new<T: DbProvider + Send + Sync + 'static>(provider: T) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl salvo::Handler for DbProviderHandler {
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.provider));
    }
}

/// ## Summary
/// Retrieves the storage provider an admin handler should query through.
///
/// ## Errors
/// `InvariantViolation` when the route was mounted without [`DbProviderHandler`].
pub fn get_db_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Arc<dyn DbProvider + Send + Sync + 'static>> {
    depot
        .obtain::<Arc<dyn DbProvider + Send + Sync>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Database provider not found in depot").into()
        })
}
