//! Chunk representation.
//!
//! Chunks are bounded, contiguous slices of a text produced by a chunking
//! strategy. They are transient: built for one summarization request and
//! dropped afterwards.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::io::unicode::{char_count, truncate_chars};

/// Represents a chunk of text.
///
/// # Examples
///
/// ```
/// use study_buddy::core::Chunk;
///
/// let chunk = Chunk::new("Hello, world!".to_string(), 0..13, 0);
/// assert_eq!(chunk.size(), 13);
/// assert_eq!(chunk.char_count(), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential index within the source text (0-based).
    pub index: usize,

    /// Chunk content.
    pub content: String,

    /// Byte range in the source text.
    pub byte_range: Range<usize>,

    /// Chunk metadata.
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Chunking strategy that created this chunk.
    pub strategy: Option<String>,

    /// Length of the content in characters.
    pub char_count: usize,

    /// Whether the chunk was cut just after a newline rather than at the
    /// hard size limit (or at the end of the text).
    pub line_aligned: bool,
}

impl Chunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `content` - Chunk content.
    /// * `byte_range` - Byte range in the source text.
    /// * `index` - Sequential index.
    #[must_use]
    pub fn new(content: String, byte_range: Range<usize>, index: usize) -> Self {
        let char_count = char_count(&content);
        Self {
            index,
            content,
            byte_range,
            metadata: ChunkMetadata {
                char_count,
                ..Default::default()
            },
        }
    }

    /// Creates a chunk with a specific strategy name.
    #[must_use]
    pub fn with_strategy(
        content: String,
        byte_range: Range<usize>,
        index: usize,
        strategy: &str,
    ) -> Self {
        let mut chunk = Self::new(content, byte_range, index);
        chunk.metadata.strategy = Some(strategy.to_string());
        chunk
    }

    /// Returns the size of the chunk in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns the size of the chunk in characters.
    #[must_use]
    pub const fn char_count(&self) -> usize {
        self.metadata.char_count
    }

    /// Checks if the chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the start byte offset in the source text.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.byte_range.start
    }

    /// Returns the end byte offset in the source text.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.byte_range.end
    }

    /// Marks whether the chunk ends on a line boundary.
    pub const fn set_line_aligned(&mut self, aligned: bool) {
        self.metadata.line_aligned = aligned;
    }

    /// Estimates token count (~4 characters per token).
    #[must_use]
    pub const fn estimate_tokens(&self) -> usize {
        self.metadata.char_count.div_ceil(4)
    }

    /// Returns the first `max_chars` characters of the content.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> &str {
        truncate_chars(&self.content, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk = Chunk::new("Hello".to_string(), 0..5, 0);
        assert_eq!(chunk.content, "Hello");
        assert_eq!(chunk.byte_range, 0..5);
        assert_eq!(chunk.index, 0);
        assert_eq!(chunk.char_count(), 5);
        assert!(!chunk.metadata.line_aligned);
    }

    #[test]
    fn test_chunk_with_strategy() {
        let chunk = Chunk::with_strategy("content".to_string(), 0..7, 0, "line");
        assert_eq!(chunk.metadata.strategy, Some("line".to_string()));
    }

    #[test]
    fn test_chunk_size_vs_char_count() {
        let chunk = Chunk::new("世界".to_string(), 0..6, 0);
        assert_eq!(chunk.size(), 6);
        assert_eq!(chunk.char_count(), 2);
    }

    #[test]
    fn test_chunk_offsets() {
        let chunk = Chunk::new("world".to_string(), 7..12, 1);
        assert_eq!(chunk.start(), 7);
        assert_eq!(chunk.end(), 12);
    }

    #[test]
    fn test_chunk_estimate_tokens() {
        let chunk = Chunk::new("Hello, world!".to_string(), 0..13, 0);
        assert_eq!(chunk.estimate_tokens(), 4);
    }

    #[test]
    fn test_chunk_preview() {
        let chunk = Chunk::new("Hello, world!".to_string(), 0..13, 0);
        assert_eq!(chunk.preview(5), "Hello");
        assert_eq!(chunk.preview(100), "Hello, world!");
    }

    #[test]
    fn test_chunk_empty() {
        let chunk = Chunk::new(String::new(), 0..0, 0);
        assert!(chunk.is_empty());
        assert_eq!(chunk.size(), 0);
    }
}
