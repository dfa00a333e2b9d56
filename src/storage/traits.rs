//! Storage trait definition.
//!
//! Defines the interface for persistent storage backends, enabling
//! pluggable storage implementations.

use crate::core::{Course, CourseListing, CourseQuery, Flashcard, Summary};
use crate::error::Result;
use serde::Serialize;

/// Trait for persistent storage backends.
///
/// Implementations store courses together with the latest summary and the
/// current flashcard deck of each course. Deleting a course removes both.
pub trait Storage: Send {
    /// Initializes storage (creates schema, runs migrations).
    ///
    /// Should be idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or migration fails.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Resets all stored state.
    ///
    /// Deletes all data but preserves the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&mut self) -> Result<()>;

    // ==================== Course Operations ====================

    /// Adds a course and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn add_course(&mut self, course: &Course) -> Result<i64>;

    /// Retrieves a course by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_course(&self, id: i64) -> Result<Option<Course>>;

    /// Retrieves the newest course with exactly this name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_course_by_name(&self, name: &str) -> Result<Option<Course>>;

    /// Lists courses newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_courses(&self, query: &CourseQuery) -> Result<Vec<CourseListing>>;

    /// Deletes a course with its summary and flashcards.
    ///
    /// Returns `false` when no course had this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn delete_course(&mut self, id: i64) -> Result<bool>;

    /// Returns the number of stored courses.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    fn course_count(&self) -> Result<usize>;

    // ==================== Summary Operations ====================

    /// Stores a summary, replacing any earlier one for the same course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course does not exist or the write fails.
    fn save_summary(&mut self, summary: &Summary) -> Result<()>;

    /// Retrieves the stored summary of a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_summary(&self, course_id: i64) -> Result<Option<Summary>>;

    // ==================== Flashcard Operations ====================

    /// Replaces the flashcard deck of a course.
    ///
    /// The old deck is deleted and the new one inserted atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    fn replace_flashcards(&mut self, course_id: i64, cards: &[Flashcard]) -> Result<()>;

    /// Retrieves the flashcards of a course ordered by card index.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_flashcards(&self, course_id: i64) -> Result<Vec<Flashcard>>;

    // ==================== Utility Operations ====================

    /// Gets storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StorageStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    /// Number of courses stored.
    pub course_count: usize,
    /// Number of stored summaries.
    pub summary_count: usize,
    /// Total number of flashcards across all courses.
    pub flashcard_count: usize,
    /// Total length of all course content in characters.
    pub total_content_chars: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
