use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use reserva_app::app::api::routes;
use reserva_app::db_handler::DbProviderHandler;
use reserva_app::service_handler::BookingServiceHandler;
use reserva_core::config::{Settings, load_config};
use reserva_db::db::connection::create_pool;
use reserva_service::booking::service::BookingService;
use reserva_service::collaborator::{Collaborators, Notifier, webhook::WebhookNotifier};
use reserva_service::reminder::ReminderScheduler;
use reserva_service::store::pg::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Reserva scheduling engine");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(config.database.url.clone()).await?;

    let pool = create_pool(&config.database).await?;

    tracing::info!("Database connection pool created.");

    let store = Arc::new(PgStore::new(pool.clone()));
    let collaborators = Arc::new(build_collaborators(&config));

    let service = Arc::new(BookingService::new(
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        Arc::clone(&collaborators),
        TimeDelta::hours(config.booking.cancellation_notice_hours),
    ));

    let reminder = config.reminder.enabled.then(|| {
        ReminderScheduler::new(
            Arc::clone(&store) as _,
            Arc::clone(&collaborators),
            TimeDelta::hours(config.reminder.lead_hours),
            Duration::from_secs(config.reminder.poll_interval_secs),
        )
        .start()
    });

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler::new(pool))
        .hoop(BookingServiceHandler { service })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    if let Some(handle) = reminder {
        handle.stop().await;
    }

    Ok(())
}

fn build_collaborators(config: &Settings) -> Collaborators {
    let sync_timeout = Duration::from_secs(config.notifier.sync_timeout_secs);
    match &config.notifier.webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Using webhook notifier");
            Collaborators {
                notifier: Arc::new(WebhookNotifier::new(url.clone())) as Arc<dyn Notifier>,
                calendar: None,
                meeting: None,
                sync_timeout,
            }
        }
        None => Collaborators::log_only(sync_timeout),
    }
}

/// Applies pending embedded migrations over a blocking connection before the
/// async pool comes up.
async fn run_migrations(database_url: String) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        use diesel::Connection;
        use diesel_migrations::MigrationHarness;

        let mut conn = diesel::PgConnection::establish(&database_url)?;
        conn.run_pending_migrations(reserva_db::MIGRATIONS)
            .map_err(|err| anyhow::anyhow!("Failed to run migrations: {err}"))?;
        Ok(())
    })
    .await??;

    tracing::info!("Database migrations applied");
    Ok(())
}
