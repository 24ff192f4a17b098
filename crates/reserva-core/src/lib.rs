//! Reserva scheduling engine - shared configuration, constants, and core types.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
