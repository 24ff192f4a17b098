//! Slot computation: candidate generation and conflict resolution.

pub mod conflict;
pub mod slot;

#[cfg(test)]
mod conflict_tests;
#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod slot_tests;
