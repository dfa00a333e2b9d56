//! Storage layer for study-buddy.
//!
//! Persists courses, their latest summary and their flashcard deck in
//! `SQLite`. A storage handle is opened by the caller and passed to every
//! operation that needs it.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageStats};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".study-buddy/study.db";
