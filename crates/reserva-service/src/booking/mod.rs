//! Booking state machine and orchestration.

pub mod lifecycle;
pub mod service;

#[cfg(test)]
mod lifecycle_tests;
