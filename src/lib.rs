//! # study-buddy
//!
//! Turns course material into revision outlines and flashcards.
//!
//! Documents are stored as courses in `SQLite`. A course is summarized by
//! splitting it into line-aligned chunks, summarizing each chunk with a
//! language model, merging the fragments when there is more than one, and
//! trimming the result to a character budget on a marker boundary.
//!
//! ## Features
//!
//! - **Chunking**: bounded, newline-preferring chunks counted in characters
//! - **Outlines**: a two-marker plain-text grammar (`## ` sections, `- ` points)
//! - **Flashcards**: exact-size decks with configurable shortfall handling
//! - **`SQLite` Storage**: courses, summaries and decks with schema migrations
//! - **Pluggable models**: any [`TextGenerator`], with an `OpenAI` adapter
//!
//! ## Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use study_buddy::{ChunkedSummarizer, ScriptedGenerator, SummarizerConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let generator = ScriptedGenerator::with_responses(["## Cells\n- Smallest unit of life"]);
//! let summarizer = ChunkedSummarizer::new(&generator, SummarizerConfig::default()).unwrap();
//! let outline = summarizer
//!     .summarize("Cells are the smallest unit of life.", None, NonZeroUsize::new(1200).unwrap())
//!     .await
//!     .unwrap();
//! assert!(outline.starts_with("## Cells"));
//! # });
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod chunking;
pub mod cli;
pub mod core;
pub mod error;
pub mod flashcards;
pub mod generation;
pub mod io;
pub mod prompt;
pub mod storage;
pub mod summarize;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Chunk, ChunkMetadata, Course, CourseListing, CourseQuery, Flashcard, Summary};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, SqliteStorage, Storage, StorageStats};

// Re-export chunking types
pub use chunking::{Chunker, LineChunker};

// Re-export pipeline types
pub use summarize::{
    ChunkedSummarizer, MarkerGrammar, SummarizerConfig, SummaryOutcome, trim_to_budget,
};

// Re-export flashcard types
pub use flashcards::{FlashcardConfig, FlashcardGenerator, ShortfallPolicy, parse_cards};

// Re-export generation types
#[cfg(feature = "openai")]
pub use generation::OpenAiGenerator;
pub use generation::{
    GenerationOptions, OpenAiConfig, ScriptedGenerator, TextGenerator, create_generator,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
