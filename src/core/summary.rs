//! Stored course summaries.

use serde::{Deserialize, Serialize};

use super::current_timestamp;

/// The outline most recently generated for a course.
///
/// There is at most one summary per course; regenerating replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Course this summary belongs to.
    pub course_id: i64,
    /// The trimmed marked outline.
    pub outline: String,
    /// Character budget the outline was trimmed to.
    pub budget: usize,
    /// Extra instruction supplied by the user, if any.
    pub instruction: Option<String>,
    /// Number of chunks the course content was split into.
    pub chunk_count: usize,
    /// Unix timestamp when the summary was generated.
    pub created_at: i64,
}

impl Summary {
    /// Creates a summary stamped with the current time.
    #[must_use]
    pub fn new(
        course_id: i64,
        outline: String,
        budget: usize,
        instruction: Option<String>,
        chunk_count: usize,
    ) -> Self {
        Self {
            course_id,
            outline,
            budget,
            instruction,
            chunk_count,
            created_at: current_timestamp(),
        }
    }
}
