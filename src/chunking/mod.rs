//! Chunking for study-buddy.
//!
//! Long course texts are split into bounded chunks before summarization.
//! The [`Chunker`] trait abstracts the strategy; [`LineChunker`] is the
//! line-aware strategy the summarizer uses.

pub mod line;
pub mod traits;

pub use line::{ChunkSpans, LineChunker};
pub use traits::{ChunkSliceExt, Chunker};

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 12_000;

/// Default number of characters a chunk must span before it may end on a
/// newline.
pub const DEFAULT_MIN_ADVANCE: usize = 1_000;

/// Maximum allowed chunk size (250k chars).
pub const MAX_CHUNK_CHARS: usize = 250_000;
