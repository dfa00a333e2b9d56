//! Unicode utilities for text processing.
//!
//! All user-facing lengths in study-buddy (chunk sizes, budgets, name and
//! flashcard limits) are measured in Unicode scalar values, not bytes.
//! These helpers convert between the two without ever splitting a
//! character.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the characters (Unicode scalar values) in a string.
///
/// # Examples
///
/// ```
/// use study_buddy::io::unicode::char_count;
///
/// assert_eq!(char_count("Hello"), 5);
/// assert_eq!(char_count("世界"), 2);
/// ```
#[must_use]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Returns the byte offset of the character at index `char_idx`.
///
/// Indices at or past the end map to `s.len()`.
///
/// # Examples
///
/// ```
/// use study_buddy::io::unicode::byte_offset_of_char;
///
/// let s = "a世b";
/// assert_eq!(byte_offset_of_char(s, 1), 1);
/// assert_eq!(byte_offset_of_char(s, 2), 4);
/// assert_eq!(byte_offset_of_char(s, 9), s.len());
/// ```
#[must_use]
pub fn byte_offset_of_char(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Returns the prefix of `s` holding at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    &s[..byte_offset_of_char(s, max_chars)]
}

/// Truncates a string at a grapheme cluster boundary.
///
/// Used for display previews, where splitting an emoji sequence or a
/// combining mark would look broken.
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let end_byte = s
        .grapheme_indices(true)
        .nth(max_graphemes)
        .map_or(s.len(), |(i, _)| i);
    &s[..end_byte]
}

/// Removes control characters, keeping newlines and tabs.
#[must_use]
pub fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}
