//! Marked-outline summarization.
//!
//! The pipeline is Chunk, then Summarize each chunk, then Synthesize when
//! there is more than one fragment, then Trim. See [`ChunkedSummarizer`].

pub mod markers;
pub mod pipeline;
pub mod trim;

pub use markers::{MarkerGrammar, OutlineStats};
pub use pipeline::{ChunkedSummarizer, SummaryOutcome};
pub use trim::{DEFAULT_TRIM_WINDOW, trim_to_budget};

use crate::chunking::{DEFAULT_MAX_CHUNK_CHARS, DEFAULT_MIN_ADVANCE};
use crate::generation::DEFAULT_TEMPERATURE;

/// Default outline budget in characters.
pub const DEFAULT_BUDGET: usize = 1200;

/// Settings for [`ChunkedSummarizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    /// Maximum chunk length in characters.
    pub max_chunk_chars: usize,
    /// Characters a chunk must span before it may end on a newline.
    pub min_advance: usize,
    /// Distance from the budget within which a marker-aligned cut is used.
    pub trim_window: usize,
    /// Outline markers.
    pub markers: MarkerGrammar,
    /// Sampling temperature for every call.
    pub temperature: f32,
    /// Output token cap for every call.
    pub max_output_tokens: Option<u32>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            min_advance: DEFAULT_MIN_ADVANCE,
            trim_window: DEFAULT_TRIM_WINDOW,
            markers: MarkerGrammar::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
        }
    }
}
