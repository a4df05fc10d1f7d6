//! Domain model for the journey habit tracker: programs, tasks, per-day
//! progress, metrics with progress rules, and the day-resolution logic that
//! decides what "today" means under an end-of-day cutoff.
//!
//! This crate is pure: no I/O, no storage, no wall-clock reads outside
//! [`time::Clock`].

#![forbid(unsafe_code)]

pub mod day;
pub mod error;
pub mod model;
pub mod time;

pub use error::Error;
pub use time::Clock;
