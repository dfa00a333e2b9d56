//! Line-aware chunking strategy.
//!
//! Splits text into chunks of at most `max_chars` characters, preferring
//! to cut just after a newline. Lengths are counted in characters and
//! cuts always land on UTF-8 boundaries.

use std::iter::FusedIterator;
use std::ops::Range;

use crate::chunking::traits::Chunker;
use crate::chunking::{DEFAULT_MAX_CHUNK_CHARS, DEFAULT_MIN_ADVANCE, MAX_CHUNK_CHARS};
use crate::core::Chunk;
use crate::error::{ChunkingError, Result};
use crate::io::unicode::byte_offset_of_char;

/// Chunker that cuts on line boundaries where it can.
///
/// For each chunk it looks at the next `max_chars` characters. If a
/// newline appears at or after character `min_advance` of that window, the
/// chunk ends just after the rightmost such newline; otherwise it ends at
/// the hard limit. Every chunk but the last therefore advances by at
/// least `min(min_advance + 1, max_chars)` characters.
///
/// # Examples
///
/// ```
/// use study_buddy::chunking::LineChunker;
///
/// let chunker = LineChunker::with_min_advance(10, 2).unwrap();
/// let spans: Vec<_> = chunker.spans("alpha\nbravo\ncharlie").collect();
/// assert_eq!(spans, vec![0..6, 6..12, 12..19]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChunker {
    /// Maximum chunk length in characters.
    max_chars: usize,
    /// Characters a chunk must span before a newline cut is allowed.
    min_advance: usize,
}

impl Default for LineChunker {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
            min_advance: DEFAULT_MIN_ADVANCE,
        }
    }
}

impl LineChunker {
    /// Creates a chunker with the default minimum advance.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chars` is zero or above [`MAX_CHUNK_CHARS`].
    pub fn new(max_chars: usize) -> Result<Self> {
        Self::with_min_advance(max_chars, DEFAULT_MIN_ADVANCE)
    }

    /// Creates a chunker with a custom minimum advance.
    ///
    /// `min_advance` is capped at `max_chars`; at the cap every cut is a
    /// hard cut.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chars` is zero or above [`MAX_CHUNK_CHARS`].
    pub fn with_min_advance(max_chars: usize, min_advance: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "max chunk size must be > 0".to_string(),
            }
            .into());
        }
        if max_chars > MAX_CHUNK_CHARS {
            return Err(ChunkingError::ChunkTooLarge {
                size: max_chars,
                max: MAX_CHUNK_CHARS,
            }
            .into());
        }
        Ok(Self {
            max_chars,
            min_advance: min_advance.min(max_chars),
        })
    }

    /// Returns the maximum chunk length in characters.
    #[must_use]
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Returns the effective minimum advance.
    #[must_use]
    pub const fn min_advance(&self) -> usize {
        self.min_advance
    }

    /// Returns a lazy iterator over chunk byte ranges.
    ///
    /// The iterator is cheap to clone; a clone restarts from where the
    /// original was.
    #[must_use]
    pub const fn spans<'a>(&self, text: &'a str) -> ChunkSpans<'a> {
        ChunkSpans {
            text,
            offset: 0,
            max_chars: self.max_chars,
            min_advance: self.min_advance,
            done: false,
        }
    }
}

impl Chunker for LineChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.spans(text)
            .enumerate()
            .map(|(index, range)| {
                let content = text[range.clone()].to_string();
                let aligned = content.ends_with('\n');
                let mut chunk = Chunk::with_strategy(content, range, index, self.name());
                chunk.set_line_aligned(aligned);
                chunk
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "line"
    }

    fn max_chunk_chars(&self) -> usize {
        self.max_chars
    }

    fn description(&self) -> &'static str {
        "Bounded chunks cut after the last newline in the window, hard cut otherwise"
    }
}

/// Iterator over the byte ranges of a text's chunks.
///
/// Produced by [`LineChunker::spans`]. Yields at least one range (an empty
/// text yields `0..0`) and then stops for good.
#[derive(Debug, Clone)]
pub struct ChunkSpans<'a> {
    text: &'a str,
    offset: usize,
    max_chars: usize,
    min_advance: usize,
    done: bool,
}

impl Iterator for ChunkSpans<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.offset;
        let rest = &self.text[start..];
        let hard = byte_offset_of_char(rest, self.max_chars);

        if hard == rest.len() {
            self.done = true;
            self.offset = self.text.len();
            return Some(start..self.text.len());
        }

        let floor = byte_offset_of_char(rest, self.min_advance);
        let cut = rest[floor..hard]
            .rfind('\n')
            .map_or(hard, |nl| floor + nl + 1);

        self.offset = start + cut;
        Some(start..self.offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = self.text.len() - self.offset;
        // Each non-final chunk covers at least one char, so at least one byte.
        (1, Some(remaining.max(1)))
    }
}

impl FusedIterator for ChunkSpans<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::traits::ChunkSliceExt;
    use crate::error::Error;
    use crate::io::unicode::char_count;

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = LineChunker::default();
        let text = "x".repeat(500);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(chunks[0].metadata.strategy.as_deref(), Some("line"));
    }

    #[test]
    fn test_exact_max_is_single_chunk() {
        let chunker = LineChunker::with_min_advance(10, 2).unwrap();
        let chunks = chunker.chunk("0123456789");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_empty_text_yields_one_empty_chunk() {
        let chunker = LineChunker::default();
        let chunks = chunker.chunk("");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
        assert_eq!(chunks[0].byte_range, 0..0);
    }

    #[test]
    fn test_thirty_thousand_chars_without_newlines() {
        let chunker = LineChunker::default();
        let text = "a".repeat(30_000);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.char_count() <= 12_000));
        assert_eq!(chunks[0].char_count(), 12_000);
        assert_eq!(chunks.concat_content(), text);
    }

    #[test]
    fn test_cuts_after_rightmost_newline_in_window() {
        let chunker = LineChunker::with_min_advance(20, 5).unwrap();
        let text = "aaaaaaa\nbbbbbbb\nccccccccccccccc";
        let spans: Vec<_> = chunker.spans(text).collect();
        assert_eq!(spans[0], 0..16);
        assert_eq!(&text[spans[0].clone()], "aaaaaaa\nbbbbbbb\n");
        assert!(chunker.chunk(text)[0].metadata.line_aligned);
    }

    #[test]
    fn test_newline_before_min_advance_is_ignored() {
        let chunker = LineChunker::with_min_advance(10, 5).unwrap();
        let text = "ab\ncdefghijklmnop";
        let first = chunker.spans(text).next().unwrap();
        assert_eq!(first, 0..10);
    }

    #[test]
    fn test_min_advance_capped_at_max() {
        let chunker = LineChunker::with_min_advance(8, 1000).unwrap();
        assert_eq!(chunker.min_advance(), 8);
        let spans: Vec<_> = chunker.spans("abc\ndefg\nhijkl").collect();
        assert_eq!(spans, vec![0..8, 8..14]);
    }

    #[test]
    fn test_multibyte_counts_chars() {
        let chunker = LineChunker::with_min_advance(3, 0).unwrap();
        let text = "世界你好吗";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "世界你");
        assert_eq!(chunks[1].content, "好吗");
        assert_eq!(chunks.concat_content(), text);
    }

    #[test]
    fn test_spans_iterator_is_fused_and_cloneable() {
        let chunker = LineChunker::with_min_advance(4, 0).unwrap();
        let mut spans = chunker.spans("abcdefghij");
        let restart = spans.clone();
        assert_eq!(spans.next(), Some(0..4));
        assert_eq!(spans.by_ref().count(), 2);
        assert_eq!(spans.next(), None);
        assert_eq!(spans.next(), None);
        assert_eq!(restart.count(), 3);
    }

    #[test]
    fn test_progress_bound() {
        let chunker = LineChunker::with_min_advance(50, 10).unwrap();
        let text = "line\n".repeat(200);
        let chunks = chunker.chunk(&text);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.char_count() >= 11);
            assert!(chunk.char_count() <= 50);
        }
        assert!(chunks.len() <= char_count(&text).div_ceil(10));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            LineChunker::new(0),
            Err(Error::Chunking(ChunkingError::InvalidConfig { .. }))
        ));
        assert!(matches!(
            LineChunker::new(MAX_CHUNK_CHARS + 1),
            Err(Error::Chunking(ChunkingError::ChunkTooLarge { .. }))
        ));
        assert!(LineChunker::new(MAX_CHUNK_CHARS).is_ok());
    }

    #[test]
    fn test_chunk_indices_and_offsets_are_contiguous() {
        let chunker = LineChunker::with_min_advance(7, 2).unwrap();
        let text = "one\ntwo\nthree\nfour\nfive\n";
        let chunks = chunker.chunk(text);
        let mut expected_start = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start(), expected_start);
            expected_start = chunk.end();
        }
        assert_eq!(expected_start, text.len());
    }
}
