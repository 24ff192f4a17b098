use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub booking: BookingPolicyConfig,
    pub reminder: ReminderConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Booking policy knobs that are deployment-wide rather than per-offering.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingPolicyConfig {
    /// Minimum lead time (hours) required to cancel or reschedule a booking.
    pub cancellation_notice_hours: i64,
}

/// Reminder scheduler settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// How far ahead of a booking's start a reminder is sent, in hours.
    pub lead_hours: i64,
    /// Poll interval of the scheduler task, in seconds.
    pub poll_interval_secs: u64,
}

/// Outbound notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Webhook endpoint for booking events. When unset, events are only logged.
    pub webhook_url: Option<String>,
    /// Upper bound on a single collaborator call, in seconds.
    pub sync_timeout_secs: u64,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8710)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default(
                "booking.cancellation_notice_hours",
                crate::constants::DEFAULT_CANCELLATION_NOTICE_HOURS,
            )?
            .set_default("reminder.enabled", true)?
            .set_default("reminder.lead_hours", 24)?
            .set_default("reminder.poll_interval_secs", 60)?
            .set_default("notifier.sync_timeout_secs", 5)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
