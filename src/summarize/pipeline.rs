//! Chunked summarization pipeline.
//!
//! Chunk, summarize each chunk, merge when there is more than one
//! fragment, then trim to the character budget. Chunks are summarized one
//! after another; the first generator error ends the run and is returned
//! unchanged.

use std::num::NonZeroUsize;

use serde::Serialize;
use tracing::{debug, info};

use super::SummarizerConfig;
use super::trim::trim_to_budget;
use crate::chunking::LineChunker;
use crate::error::{GenerationError, Result};
use crate::generation::{GenerationOptions, TextGenerator};
use crate::io::unicode::char_count;
use crate::prompt::{ChunkPosition, PromptSet, sanitize_instruction};

/// Result of a summarization run, with the numbers worth storing or
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    /// The trimmed outline.
    pub outline: String,
    /// Number of chunks the text was split into.
    pub chunk_count: usize,
    /// Whether a merge call was made.
    pub merged: bool,
    /// Length of the outline before trimming, in characters.
    pub untrimmed_chars: usize,
}

/// Turns arbitrary-length text into one marked, budget-bounded outline.
///
/// The generator is borrowed, so one generator can serve many summarizers
/// and the caller decides its lifetime.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use study_buddy::generation::ScriptedGenerator;
/// use study_buddy::summarize::{ChunkedSummarizer, SummarizerConfig};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let generator = ScriptedGenerator::with_responses(["## Cells\n- Basic unit of life"]);
/// let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default()).unwrap();
/// let budget = NonZeroUsize::new(1200).unwrap();
/// let outline = summarizer.summarize("Cells are...", None, budget).await.unwrap();
/// assert_eq!(outline, "## Cells\n- Basic unit of life");
/// # });
/// ```
pub struct ChunkedSummarizer<'g> {
    generator: &'g dyn TextGenerator,
    chunker: LineChunker,
    prompts: PromptSet,
    config: SummarizerConfig,
}

impl std::fmt::Debug for ChunkedSummarizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedSummarizer")
            .field("generator", &self.generator.label())
            .field("chunker", &self.chunker)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'g> ChunkedSummarizer<'g> {
    /// Creates a summarizer with the default prompts.
    ///
    /// # Errors
    ///
    /// Returns a chunking error if the chunk size settings are invalid.
    pub fn new(generator: &'g dyn TextGenerator, config: SummarizerConfig) -> Result<Self> {
        let chunker = LineChunker::with_min_advance(config.max_chunk_chars, config.min_advance)?;
        Ok(Self {
            generator,
            chunker,
            prompts: PromptSet::defaults(),
            config,
        })
    }

    /// Replaces the instruction templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Returns the chunker in use.
    #[must_use]
    pub const fn chunker(&self) -> &LineChunker {
        &self.chunker
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    /// Summarizes one chunk into a marked fragment.
    ///
    /// The budget is passed to the model as guidance only.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged.
    pub async fn summarize_chunk(
        &self,
        chunk: &str,
        instruction: Option<&str>,
        budget: NonZeroUsize,
        position: ChunkPosition,
    ) -> std::result::Result<String, GenerationError> {
        let system = self.prompts.chunk_instruction(
            &self.config.markers,
            budget.get(),
            position,
            instruction,
        );
        let fragment = self
            .generator
            .generate(&system, chunk, &self.options())
            .await?;
        debug!(
            index = position.index,
            total = position.total,
            fragment_chars = char_count(&fragment),
            "chunk summarized"
        );
        Ok(fragment)
    }

    /// Combines per-chunk fragments into one outline.
    ///
    /// A single fragment is returned as-is without a model call. Several
    /// fragments are joined with newlines and merged by one model call. No
    /// fragments give an empty outline.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged.
    pub async fn synthesize(
        &self,
        mut fragments: Vec<String>,
        instruction: Option<&str>,
        budget: NonZeroUsize,
    ) -> std::result::Result<String, GenerationError> {
        match fragments.len() {
            0 => Ok(String::new()),
            1 => Ok(fragments.swap_remove(0)),
            n => {
                let joined = fragments.join("\n");
                debug!(fragments = n, joined_chars = char_count(&joined), "merging fragments");
                let system =
                    self.prompts
                        .merge_instruction(&self.config.markers, budget.get(), instruction);
                self.generator
                    .generate(&system, &joined, &self.options())
                    .await
            }
        }
    }

    /// Runs the full pipeline and returns the outline.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged.
    pub async fn summarize(
        &self,
        text: &str,
        instruction: Option<&str>,
        budget: NonZeroUsize,
    ) -> std::result::Result<String, GenerationError> {
        self.summarize_detailed(text, instruction, budget)
            .await
            .map(|outcome| outcome.outline)
    }

    /// Runs the full pipeline and reports how it went.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged.
    pub async fn summarize_detailed(
        &self,
        text: &str,
        instruction: Option<&str>,
        budget: NonZeroUsize,
    ) -> std::result::Result<SummaryOutcome, GenerationError> {
        let instruction = sanitize_instruction(instruction);
        let spans: Vec<_> = self.chunker.spans(text).collect();
        let total = spans.len();
        info!(
            text_chars = char_count(text),
            chunks = total,
            budget = budget.get(),
            "summarizing"
        );

        let mut fragments = Vec::with_capacity(total);
        for (index, span) in spans.into_iter().enumerate() {
            let fragment = self
                .summarize_chunk(
                    &text[span],
                    instruction.as_deref(),
                    budget,
                    ChunkPosition { index, total },
                )
                .await?;
            fragments.push(fragment);
        }

        let merged = fragments.len() > 1;
        let combined = self
            .synthesize(fragments, instruction.as_deref(), budget)
            .await?;
        let untrimmed_chars = char_count(&combined);
        let outline = trim_to_budget(
            &combined,
            budget,
            &self.config.markers,
            self.config.trim_window,
        );

        let shape = self.config.markers.stats(&outline);
        info!(
            untrimmed_chars,
            outline_chars = char_count(&outline),
            merged,
            sections = shape.sections,
            points = shape.points,
            "summary ready"
        );
        if shape.other > 0 {
            debug!(lines = shape.other, "outline has unmarked lines");
        }

        Ok(SummaryOutcome {
            outline,
            chunk_count: total,
            merged,
            untrimmed_chars,
        })
    }
}
