//! Chunker trait definition.
//!
//! Defines the interface for chunking strategies so the summarizer can be
//! driven by any segmentation approach.

use crate::core::Chunk;

/// Trait for chunking text into bounded segments.
///
/// Implementations validate their configuration when they are built, so
/// chunking itself cannot fail. Output must be deterministic, ordered,
/// and non-overlapping, and concatenating the chunk contents must give
/// back the input exactly.
///
/// # Examples
///
/// ```
/// use study_buddy::chunking::{ChunkSliceExt, Chunker, LineChunker};
///
/// let chunker = LineChunker::with_min_advance(100, 10).unwrap();
/// let text = "Hello, world!\n".repeat(20);
/// let chunks = chunker.chunk(&text);
/// assert!(chunks.len() > 1);
/// assert_eq!(chunks.concat_content(), text);
/// ```
pub trait Chunker: Send + Sync {
    /// Chunks the input text into segments.
    ///
    /// Always returns at least one chunk; empty input yields one empty
    /// chunk.
    fn chunk(&self, text: &str) -> Vec<Chunk>;

    /// Returns the name of the chunking strategy.
    fn name(&self) -> &'static str;

    /// Returns the maximum chunk length in characters.
    fn max_chunk_chars(&self) -> usize;

    /// Returns a description of the chunking strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }
}

/// Helpers over a chunk sequence.
pub trait ChunkSliceExt {
    /// Concatenates chunk contents in order.
    fn concat_content(&self) -> String;
}

impl ChunkSliceExt for [Chunk] {
    fn concat_content(&self) -> String {
        self.iter().map(|c| c.content.as_str()).collect()
    }
}
