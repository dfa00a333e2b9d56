//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::chunking::DEFAULT_MAX_CHUNK_CHARS;
use crate::flashcards::{DEFAULT_CARD_COUNT, ShortfallPolicy};
use crate::generation::{DEFAULT_MODEL, OpenAiConfig};
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// study-buddy: turn course material into outlines and flashcards.
///
/// Stores documents as courses and summarizes them with a language model
/// into length-bounded outlines and flashcard decks.
#[derive(Parser, Debug)]
#[command(name = "study-buddy")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database file.
    ///
    /// Defaults to `.study-buddy/study.db` in the current directory.
    #[arg(short, long, env = "STUDY_BUDDY_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Chat model used for summaries and flashcards.
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// API key for the chat completions endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Directory with prompt template overrides.
    #[arg(long, global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show storage statistics.
    Status,

    /// Delete all courses, summaries and flashcards.
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Add documents or text as one course.
    ///
    /// Several files are bundled into a single course. With neither files
    /// nor --text, the content is read from stdin.
    Add {
        /// PDF, DOCX, PPTX or plain-text files.
        files: Vec<PathBuf>,

        /// Course name (defaults to the first file name).
        #[arg(short, long)]
        name: Option<String>,

        /// Raw text to store instead of files.
        #[arg(short, long, conflicts_with = "files")]
        text: Option<String>,
    },

    /// List courses, newest first.
    #[command(name = "list", alias = "ls")]
    List {
        /// Maximum number of courses.
        #[arg(short, long, default_value = "25")]
        limit: usize,

        /// Number of courses to skip.
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Only courses whose name contains this text (case-insensitive).
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show course details.
    Show {
        /// Course ID or name.
        course: String,

        /// Print the full content as well.
        #[arg(short, long)]
        content: bool,
    },

    /// Delete a course with its summary and flashcards.
    #[command(alias = "rm")]
    Delete {
        /// Course ID or name.
        course: String,

        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show how a course would be chunked.
    Chunks {
        /// Course ID or name.
        course: String,

        /// Maximum chunk length in characters.
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,
    },

    /// Summarize a course into an outline and store it.
    Summarize {
        /// Course ID or name.
        course: String,

        /// Extra instruction for the model.
        #[arg(short, long)]
        prompt: Option<String>,

        /// Outline budget in characters.
        #[arg(short, long, default_value = "1200")]
        budget: NonZeroUsize,

        /// Maximum chunk length in characters.
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,
    },

    /// Print the stored summary of a course.
    Summary {
        /// Course ID or name.
        course: String,
    },

    /// Summarize a file or stdin without storing anything.
    Outline {
        /// PDF, DOCX, PPTX or plain-text file (stdin if omitted).
        file: Option<PathBuf>,

        /// Also write the outline to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra instruction for the model.
        #[arg(short, long)]
        prompt: Option<String>,

        /// Outline budget in characters.
        #[arg(short, long, default_value = "1200")]
        budget: NonZeroUsize,

        /// Maximum chunk length in characters.
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,
    },

    /// Flashcard operations.
    #[command(subcommand)]
    Flashcards(FlashcardCommands),

    /// Write the default prompt templates for editing.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (defaults to ~/.config/study-buddy/prompts).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Flashcard subcommands.
#[derive(Subcommand, Debug)]
pub enum FlashcardCommands {
    /// Generate a deck for a course, replacing the previous one.
    Generate {
        /// Course ID or name.
        course: String,

        /// Number of cards (1-50).
        #[arg(short = 'n', long, default_value_t = DEFAULT_CARD_COUNT)]
        count: usize,

        /// What to do when the model returns too few cards (pad, fail).
        #[arg(long, default_value = "pad")]
        on_shortfall: ShortfallPolicy,
    },

    /// List the stored cards of a course.
    List {
        /// Course ID or name.
        course: String,
    },
}

impl Commands {
    /// Whether the command calls the language model.
    #[must_use]
    pub const fn needs_generator(&self) -> bool {
        matches!(
            self,
            Self::Summarize { .. }
                | Self::Outline { .. }
                | Self::Flashcards(FlashcardCommands::Generate { .. })
        )
    }
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }

    /// Builds the generator settings from the global options.
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::default()
            .model(&self.model)
            .api_key(self.api_key.as_deref())
            .api_base(self.api_base.as_deref())
    }
}
