//! Reserva scheduling engine - PostgreSQL persistence layer.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod db;
pub mod error;
pub mod model;

/// Embedded SQL migrations, applied at startup by the application binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
