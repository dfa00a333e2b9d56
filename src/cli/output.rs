//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{Chunk, Course, CourseListing, Flashcard, Summary};
use crate::error::Error;
use crate::io::unicode::{char_count, truncate_chars};
use crate::storage::StorageStats;
use crate::summarize::SummaryOutcome;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json => format_json(stats),
    }
}

fn format_status_text(stats: &StorageStats) -> String {
    let mut output = String::new();
    output.push_str("study-buddy status\n");
    output.push_str("==================\n\n");
    let _ = writeln!(output, "  Courses:       {}", stats.course_count);
    let _ = writeln!(output, "  Summaries:     {}", stats.summary_count);
    let _ = writeln!(output, "  Flashcards:    {}", stats.flashcard_count);
    let _ = writeln!(
        output,
        "  Content:       {} chars",
        stats.total_content_chars
    );
    let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:       {}", format_size(size));
    }
    output
}

/// Formats a course list.
#[must_use]
pub fn format_course_list(courses: &[CourseListing], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_course_list_text(courses),
        OutputFormat::Json => format_json(&courses),
    }
}

fn format_course_list_text(courses: &[CourseListing]) -> String {
    if courses.is_empty() {
        return "No courses found.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(output, "{:<6} {:<40} {:>10}", "ID", "Name", "Chars");
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for course in courses {
        let _ = writeln!(
            output,
            "{:<6} {:<40} {:>10}",
            course.id,
            truncate(&course.name, 40),
            course.content_len
        );
    }

    output
}

/// Details shown for a single course.
#[derive(Debug, Serialize)]
pub struct CourseDetails<'a> {
    /// The course itself.
    #[serde(flatten)]
    pub course: &'a Course,
    /// Content length in characters.
    pub content_len: usize,
    /// Whether a summary is stored.
    pub has_summary: bool,
    /// Number of stored flashcards.
    pub flashcard_count: usize,
}

/// Formats a single course.
///
/// The content is only included in text output when `with_content` is
/// set; JSON output always carries it.
#[must_use]
pub fn format_course(details: &CourseDetails<'_>, with_content: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_course_text(details, with_content),
        OutputFormat::Json => format_json(details),
    }
}

fn format_course_text(details: &CourseDetails<'_>, with_content: bool) -> String {
    let course = details.course;
    let mut output = String::new();

    let _ = writeln!(output, "Course: {}", course.name);
    let _ = writeln!(output, "  ID:           {}", course.id.unwrap_or(0));
    let _ = writeln!(output, "  Length:       {} chars", details.content_len);
    let _ = writeln!(output, "  Lines:        {}", course.line_count());
    if !course.sources.is_empty() {
        let _ = writeln!(output, "  Sources:      {}", course.sources.join(", "));
    }
    let _ = writeln!(
        output,
        "  Summary:      {}",
        if details.has_summary { "yes" } else { "no" }
    );
    let _ = writeln!(output, "  Flashcards:   {}", details.flashcard_count);

    if with_content {
        output.push_str("---\n");
        output.push_str(&course.content);
        if !course.content.ends_with('\n') {
            output.push('\n');
        }
        output.push_str("---\n");
    } else {
        let _ = writeln!(
            output,
            "  Preview:      {}",
            course.preview(60).replace('\n', " ")
        );
    }

    output
}

/// Formats chunk boundaries.
#[must_use]
pub fn format_chunks(chunks: &[Chunk], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "{} chunks:", chunks.len());
            let _ = writeln!(
                output,
                "{:<6} {:<12} {:<12} {:<10} {:<8} Preview",
                "Index", "Start", "End", "Chars", "~Tokens"
            );
            output.push_str(&"-".repeat(79));
            output.push('\n');

            for chunk in chunks {
                let _ = writeln!(
                    output,
                    "{:<6} {:<12} {:<12} {:<10} {:<8} {}",
                    chunk.index,
                    chunk.start(),
                    chunk.end(),
                    chunk.char_count(),
                    chunk.estimate_tokens(),
                    truncate(&chunk.content.replace('\n', "\\n"), 30)
                );
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ChunkBounds {
                index: usize,
                start: usize,
                end: usize,
                chars: usize,
                tokens: usize,
                line_aligned: bool,
            }
            let bounds: Vec<_> = chunks
                .iter()
                .map(|c| ChunkBounds {
                    index: c.index,
                    start: c.start(),
                    end: c.end(),
                    chars: c.char_count(),
                    tokens: c.estimate_tokens(),
                    line_aligned: c.metadata.line_aligned,
                })
                .collect();
            format_json(&bounds)
        }
    }
}

/// Formats a stored summary.
#[must_use]
pub fn format_summary(summary: &Summary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => with_newline(&summary.outline),
        OutputFormat::Json => format_json(summary),
    }
}

/// Formats a fresh outline.
#[must_use]
pub fn format_outline(outcome: &SummaryOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => with_newline(&outcome.outline),
        OutputFormat::Json => format_json(outcome),
    }
}

/// Formats a flashcard deck.
#[must_use]
pub fn format_flashcards(cards: &[Flashcard], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if cards.is_empty() {
                return "No flashcards stored.\n".to_string();
            }
            let mut output = String::new();
            for card in cards {
                let _ = writeln!(output, "{}. {}", card.card_index, card.front);
                let _ = writeln!(output, "   {}", card.back);
            }
            output
        }
        OutputFormat::Json => format_json(&cards),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
pub(crate) fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn with_newline(text: &str) -> String {
    let mut output = text.to_string();
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Truncates a string to `max_chars` characters with an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if char_count(s) <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        truncate_chars(s, max_chars).to_string()
    } else {
        format!("{}...", truncate_chars(s, max_chars - 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_status() {
        let stats = StorageStats {
            course_count: 2,
            summary_count: 1,
            flashcard_count: 10,
            total_content_chars: 1024,
            schema_version: 1,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Courses:       2"));
        assert!(text.contains("Flashcards:    10"));
        assert!(text.contains("DB size:       4.0 KB"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"course_count\": 2"));
    }

    #[test]
    fn test_format_course_list() {
        assert_eq!(
            format_course_list(&[], OutputFormat::Text),
            "No courses found.\n"
        );

        let listing = CourseListing {
            id: 3,
            name: "Biology".to_string(),
            content_len: 420,
            created_at: 0,
        };
        let text = format_course_list(std::slice::from_ref(&listing), OutputFormat::Text);
        assert!(text.contains("Biology"));
        assert!(text.contains("420"));
    }

    #[test]
    fn test_format_flashcards_text() {
        let cards = vec![Flashcard::new(1, "What is ATP?", "Energy currency")];
        let text = format_flashcards(&cards, OutputFormat::Text);
        assert_eq!(text, "1. What is ATP?\n   Energy currency\n");
    }

    #[test]
    fn test_format_error_json() {
        let err = Error::Storage(StorageError::NotInitialized);
        let json = format_error(&err, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["error"].as_str().unwrap().contains("not initialized"));
    }
}
