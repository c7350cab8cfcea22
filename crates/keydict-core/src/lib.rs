//! Shared types for the keydict word-lookup engine.
//!
//! - [`enums`] -- limits, dictionary type tags, lifecycle states
//! - [`character`] -- case and accent folding used when matching keys
//! - [`input`] -- per-position key candidates of a typed word
//! - [`suggestion`] -- ranked results, the result sink, next-letter counters

pub mod character;
pub mod enums;
pub mod input;
pub mod suggestion;
