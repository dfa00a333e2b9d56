//! Core domain models for study-buddy.
//!
//! This module contains the data structures shared by the pipeline, the
//! storage layer and the CLI: courses, chunks, stored summaries, and
//! flashcards. These are pure domain models with no I/O dependencies.

pub mod chunk;
pub mod course;
pub mod flashcard;
pub mod summary;

pub use chunk::{Chunk, ChunkMetadata};
pub use course::{Course, CourseListing, CourseQuery};
pub use flashcard::Flashcard;
pub use summary::Summary;

/// Returns the current Unix timestamp in seconds.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
