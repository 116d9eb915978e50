//! Storage backend implementations.
//!
//! Backends are enabled through feature flags:
//!
//! - `sqlite` (default) - SQLite via `rusqlite` and an `r2d2` connection pool

#[cfg(feature = "sqlite")]
pub mod sqlite;
