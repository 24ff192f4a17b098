//! Reserva scheduling engine - integration test support.
//!
//! Provides an in-memory store with the same transition and overlap
//! semantics as the PostgreSQL adapter, a notifier that records every event
//! it receives, and fixture builders shared by the integration tests.

pub mod fixtures;
pub mod memory;
pub mod recording;
