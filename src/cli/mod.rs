//! CLI layer for study-buddy.
//!
//! Provides the command-line interface using clap, with commands for
//! managing courses and turning them into outlines and flashcards.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{execute, execute_with};
pub use output::OutputFormat;
pub use parser::{Cli, Commands, FlashcardCommands};
