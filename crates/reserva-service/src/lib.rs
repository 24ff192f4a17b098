//! Reserva scheduling engine - slot computation, conflict resolution, and the
//! booking lifecycle.
//!
//! The engine is request-scoped: every public operation is bounded by
//! ordinary storage round-trips. The only background work is the reminder
//! scheduler task, which has an explicit start/stop lifecycle.

pub mod booking;
pub mod collaborator;
pub mod error;
pub mod reminder;
pub mod scheduling;
pub mod store;
