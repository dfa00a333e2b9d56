//! Course representation.
//!
//! A course is one block of study material: the concatenated text of one
//! or more source documents (or raw text), stored under a display name.

use serde::{Deserialize, Serialize};

use super::current_timestamp;
use crate::io::unicode::{char_count, truncate_chars, truncate_graphemes};

/// Name used when neither the caller nor the sources provide one.
pub const UNTITLED: &str = "Untitled";

/// A stored course.
///
/// # Examples
///
/// ```
/// use study_buddy::core::Course;
///
/// let course = Course::new("Thermodynamics", "Entropy never decreases.".to_string());
/// assert_eq!(course.content_len(), 24);
/// assert!(course.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier (assigned by storage layer).
    pub id: Option<i64>,

    /// Display name, at most [`Course::MAX_NAME_CHARS`] characters.
    pub name: String,

    /// Full course text.
    pub content: String,

    /// Stems of the files the content was extracted from.
    pub sources: Vec<String>,

    /// Unix timestamp when the course was created.
    pub created_at: i64,
}

impl Course {
    /// Maximum length of a course name in characters.
    pub const MAX_NAME_CHARS: usize = 255;

    /// Creates a course from a name and its content.
    ///
    /// The name is trimmed and truncated to [`Course::MAX_NAME_CHARS`];
    /// a blank name becomes `"Untitled"`.
    #[must_use]
    pub fn new(name: &str, content: String) -> Self {
        Self {
            id: None,
            name: normalize_name(name),
            content,
            sources: Vec::new(),
            created_at: current_timestamp(),
        }
    }

    /// Records the source file stems.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Returns the content length in characters.
    #[must_use]
    pub fn content_len(&self) -> usize {
        char_count(&self.content)
    }

    /// Returns the number of lines in the content.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Checks whether the content is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Returns the first `max_graphemes` user-perceived characters of the content.
    #[must_use]
    pub fn preview(&self, max_graphemes: usize) -> &str {
        truncate_graphemes(&self.content, max_graphemes)
    }

    /// Returns a light listing row for this course.
    #[must_use]
    pub fn listing(&self) -> CourseListing {
        CourseListing {
            id: self.id.unwrap_or(0),
            name: self.name.clone(),
            content_len: self.content_len(),
            created_at: self.created_at,
        }
    }
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        truncate_chars(trimmed, Course::MAX_NAME_CHARS).to_string()
    }
}

/// Listing projection of a course (no content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseListing {
    /// Course ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Content length in characters.
    pub content_len: usize,
    /// Unix timestamp when the course was created.
    pub created_at: i64,
}

/// Filter and paging options for listing courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseQuery {
    /// Maximum rows to return.
    pub limit: usize,
    /// Rows to skip (newest first).
    pub offset: usize,
    /// Case-insensitive substring the name must contain.
    pub name_contains: Option<String>,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            limit: 25,
            offset: 0,
            name_contains: None,
        }
    }
}

impl CourseQuery {
    /// Sets the name filter; blank filters are ignored.
    #[must_use]
    pub fn name_contains(mut self, needle: &str) -> Self {
        let needle = needle.trim();
        self.name_contains = (!needle.is_empty()).then(|| needle.to_string());
        self
    }

    /// Sets limit and offset.
    #[must_use]
    pub const fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_new() {
        let course = Course::new("  Biology 101 ", "Cells.".to_string());
        assert_eq!(course.name, "Biology 101");
        assert_eq!(course.content, "Cells.");
        assert!(course.sources.is_empty());
        assert!(course.created_at > 0);
    }

    #[test]
    fn test_course_blank_name_is_untitled() {
        let course = Course::new("   ", "x".to_string());
        assert_eq!(course.name, UNTITLED);
    }

    #[test]
    fn test_course_name_truncated_by_chars() {
        let long = "é".repeat(300);
        let course = Course::new(&long, String::new());
        assert_eq!(char_count(&course.name), Course::MAX_NAME_CHARS);
    }

    #[test]
    fn test_course_content_len_counts_chars() {
        let course = Course::new("c", "naïve 世界".to_string());
        assert_eq!(course.content_len(), 8);
        assert!(course.content.len() > 8);
    }

    #[test]
    fn test_course_blank_detection() {
        assert!(Course::new("c", " \n\t".to_string()).is_blank());
        assert!(!Course::new("c", " a ".to_string()).is_blank());
    }

    #[test]
    fn test_course_preview() {
        let course = Course::new("c", "Hello, world!".to_string());
        assert_eq!(course.preview(5), "Hello");
        assert_eq!(course.preview(100), "Hello, world!");
    }

    #[test]
    fn test_course_listing() {
        let mut course = Course::new("Physics", "abc\ndef".to_string());
        course.id = Some(3);
        let listing = course.listing();
        assert_eq!(listing.id, 3);
        assert_eq!(listing.content_len, 7);
        assert_eq!(course.line_count(), 2);
    }

    #[test]
    fn test_course_query_builder() {
        let query = CourseQuery::default().name_contains("  ").page(10, 5);
        assert_eq!(query.name_contains, None);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 5);

        let query = CourseQuery::default().name_contains("Alg");
        assert_eq!(query.name_contains.as_deref(), Some("Alg"));
    }

    #[test]
    fn test_course_serialization() {
        let course = Course::new("c", "text".to_string()).with_sources(vec!["notes".to_string()]);
        let json = serde_json::to_string(&course).unwrap();
        let back: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(back, course);
    }
}
