//! Persistence for the journey habit tracker: repository traits, an
//! in-memory backend for tests and prototyping, and the SQLite backend used
//! by the app.

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
