//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the chain host (today: time) sit behind traits in
//! `tally-types`. This crate provides test-friendly implementations that return
//! deterministic values and can be driven programmatically.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;

pub use clock::NullClock;
