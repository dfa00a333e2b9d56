//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Storage and the text
//! generator are created here and passed down explicitly.

use crate::chunking::{Chunker, LineChunker};
use crate::cli::output::{
    CourseDetails, OutputFormat, format_chunks, format_course, format_course_list,
    format_flashcards, format_json, format_outline, format_status, format_summary,
};
use crate::cli::parser::{Cli, Commands, FlashcardCommands};
use crate::core::{Course, CourseQuery, Summary};
use crate::error::{CommandError, GenerationError, Result, StorageError};
use crate::flashcards::{FlashcardConfig, FlashcardGenerator, ShortfallPolicy};
use crate::generation::{TextGenerator, create_generator};
use crate::io::{
    course_from_files, derive_course_name, extract_document, normalize_text, write_file,
};
use crate::prompt::{PromptSet, sanitize_instruction};
use crate::storage::{SqliteStorage, Storage};
use crate::summarize::{ChunkedSummarizer, SummarizerConfig};
use std::fmt::Write as _;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Executes the CLI command.
///
/// A text generator is built from the global options when the command
/// needs one.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    execute_with(cli, None).await
}

/// Executes the CLI command with an optional caller-supplied generator.
///
/// When `generator` is `None` and the command calls the model, one is
/// built from the global options.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute_with(cli: &Cli, generator: Option<&dyn TextGenerator>) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    let owned = if generator.is_none() && cli.command.needs_generator() {
        Some(create_generator(&cli.openai_config())?)
    } else {
        None
    };
    let generator = generator.or(owned.as_deref());
    let prompts = || PromptSet::load(cli.prompt_dir.as_deref());

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes, format),
        Commands::Add { files, name, text } => {
            cmd_add(&db_path, files, name.as_deref(), text.as_deref(), format)
        }
        Commands::List {
            limit,
            offset,
            query,
        } => cmd_list(&db_path, *limit, *offset, query.as_deref(), format),
        Commands::Show { course, content } => cmd_show(&db_path, course, *content, format),
        Commands::Delete { course, yes } => cmd_delete(&db_path, course, *yes, format),
        Commands::Chunks { course, max_chars } => {
            cmd_chunks(&db_path, course, *max_chars, format)
        }
        Commands::Summarize {
            course,
            prompt,
            budget,
            max_chars,
        } => {
            let summarizer = ChunkedSummarizer::new(
                require_generator(generator)?,
                summarizer_config(*max_chars),
            )?
            .with_prompts(prompts());
            cmd_summarize(&db_path, &summarizer, course, prompt.as_deref(), *budget, format).await
        }
        Commands::Summary { course } => cmd_summary(&db_path, course, format),
        Commands::Outline {
            file,
            output,
            prompt,
            budget,
            max_chars,
        } => {
            let summarizer = ChunkedSummarizer::new(
                require_generator(generator)?,
                summarizer_config(*max_chars),
            )?
            .with_prompts(prompts());
            cmd_outline(
                &summarizer,
                file.as_deref(),
                output.as_deref(),
                prompt.as_deref(),
                *budget,
                format,
            )
            .await
        }
        Commands::Flashcards(FlashcardCommands::Generate {
            course,
            count,
            on_shortfall,
        }) => {
            let flashcards = FlashcardGenerator::new(
                require_generator(generator)?,
                flashcard_config(*count, *on_shortfall),
            )?
            .with_prompts(prompts());
            cmd_flashcards_generate(&db_path, &flashcards, course, format).await
        }
        Commands::Flashcards(FlashcardCommands::List { course }) => {
            cmd_flashcards_list(&db_path, course, format)
        }
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

fn require_generator(generator: Option<&dyn TextGenerator>) -> Result<&dyn TextGenerator> {
    generator.ok_or_else(|| {
        GenerationError::NotConfigured("no text generator available".to_string()).into()
    })
}

fn summarizer_config(max_chars: usize) -> SummarizerConfig {
    SummarizerConfig {
        max_chunk_chars: max_chars,
        min_advance: SummarizerConfig::default().min_advance.min(max_chars),
        ..SummarizerConfig::default()
    }
}

fn flashcard_config(count: usize, policy: ShortfallPolicy) -> FlashcardConfig {
    FlashcardConfig {
        count,
        policy,
        ..FlashcardConfig::default()
    }
}

/// Opens storage and ensures it's initialized.
///
/// Older schemas are migrated on the way.
fn open_storage(db_path: &Path) -> Result<SqliteStorage> {
    let mut storage = SqliteStorage::open(db_path)?;

    if !storage.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }
    storage.init()?;

    Ok(storage)
}

/// Resolves a course identifier (ID or exact name) to a course.
fn resolve_course(storage: &SqliteStorage, identifier: &str) -> Result<(i64, Course)> {
    if let Ok(id) = identifier.trim().parse::<i64>()
        && let Some(course) = storage.get_course(id)?
    {
        return Ok((id, course));
    }

    if let Some(course) = storage.get_course_by_name(identifier)?
        && let Some(id) = course.id
    {
        return Ok((id, course));
    }

    Err(StorageError::CourseNotFound {
        identifier: identifier.to_string(),
    }
    .into())
}

fn ensure_content(course: &Course) -> Result<()> {
    if course.is_blank() {
        return Err(CommandError::InvalidArgument(format!(
            "course '{}' has no content",
            course.name
        ))
        .into());
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to read from stdin: {e}")))?;
    Ok(buffer)
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
        // WAL side files must not outlive the database they belong to
        for suffix in ["-wal", "-shm"] {
            let mut side = db_path.as_os_str().to_os_string();
            side.push(suffix);
            let _ = std::fs::remove_file(side);
        }
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.init()?;
    info!(path = %db_path.display(), "initialized database");

    match format {
        OutputFormat::Text => Ok(format!(
            "Initialized study-buddy database at: {}\n",
            db_path.display()
        )),
        OutputFormat::Json => Ok(format_json(&serde_json::json!({
            "initialized": true,
            "path": db_path.to_string_lossy(),
        }))),
    }
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &Path, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm reset. This will delete all data.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    storage.reset()?;

    match format {
        OutputFormat::Text => Ok("All courses deleted.\n".to_string()),
        OutputFormat::Json => Ok(format_json(&serde_json::json!({ "reset": true }))),
    }
}

fn cmd_add(
    db_path: &Path,
    files: &[PathBuf],
    name: Option<&str>,
    text: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;

    let course = if files.is_empty() {
        let raw = match text {
            Some(t) => t.to_string(),
            None => read_stdin()?,
        };
        Course::new(&derive_course_name(name, &[]), normalize_text(&raw))
    } else {
        course_from_files(files, name)?
    };

    if course.is_blank() {
        return Err(CommandError::InvalidArgument("no content to add".to_string()).into());
    }

    let id = storage.add_course(&course)?;
    info!(id, name = %course.name, "added course");

    match format {
        OutputFormat::Text => Ok(format!(
            "Added course {} (ID: {}) with {} chars\n",
            course.name,
            id,
            course.content_len()
        )),
        OutputFormat::Json => Ok(format_json(&serde_json::json!({
            "id": id,
            "name": course.name,
            "content_len": course.content_len(),
            "sources": course.sources,
        }))),
    }
}

fn cmd_list(
    db_path: &Path,
    limit: usize,
    offset: usize,
    query: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    let mut course_query = CourseQuery::default().page(limit, offset);
    if let Some(needle) = query {
        course_query = course_query.name_contains(needle);
    }
    let courses = storage.list_courses(&course_query)?;
    Ok(format_course_list(&courses, format))
}

fn cmd_show(db_path: &Path, identifier: &str, content: bool, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let (id, course) = resolve_course(&storage, identifier)?;

    let details = CourseDetails {
        course: &course,
        content_len: course.content_len(),
        has_summary: storage.get_summary(id)?.is_some(),
        flashcard_count: storage.get_flashcards(id)?.len(),
    };
    Ok(format_course(&details, content, format))
}

fn cmd_delete(db_path: &Path, identifier: &str, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm deletion.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    let (id, course) = resolve_course(&storage, identifier)?;
    storage.delete_course(id)?;

    match format {
        OutputFormat::Text => Ok(format!("Deleted course {} (ID: {id})\n", course.name)),
        OutputFormat::Json => Ok(format_json(&serde_json::json!({
            "deleted": id,
            "name": course.name,
        }))),
    }
}

fn cmd_chunks(
    db_path: &Path,
    identifier: &str,
    max_chars: usize,
    format: OutputFormat,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    let (_, course) = resolve_course(&storage, identifier)?;

    let config = summarizer_config(max_chars);
    let chunker = LineChunker::with_min_advance(config.max_chunk_chars, config.min_advance)?;
    let chunks = chunker.chunk(&course.content);
    Ok(format_chunks(&chunks, format))
}

async fn cmd_summarize(
    db_path: &Path,
    summarizer: &ChunkedSummarizer<'_>,
    identifier: &str,
    prompt: Option<&str>,
    budget: NonZeroUsize,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let (id, course) = resolve_course(&storage, identifier)?;
    ensure_content(&course)?;

    let outcome = summarizer
        .summarize_detailed(&course.content, prompt, budget)
        .await?;

    let summary = Summary::new(
        id,
        outcome.outline,
        budget.get(),
        sanitize_instruction(prompt),
        outcome.chunk_count,
    );
    storage.save_summary(&summary)?;

    Ok(format_summary(&summary, format))
}

fn cmd_summary(db_path: &Path, identifier: &str, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let (id, _) = resolve_course(&storage, identifier)?;

    let summary = storage
        .get_summary(id)?
        .ok_or(StorageError::SummaryNotFound { course_id: id })?;
    Ok(format_summary(&summary, format))
}

async fn cmd_outline(
    summarizer: &ChunkedSummarizer<'_>,
    file: Option<&Path>,
    output: Option<&Path>,
    prompt: Option<&str>,
    budget: NonZeroUsize,
    format: OutputFormat,
) -> Result<String> {
    let text = match file {
        Some(path) => extract_document(path)?.text,
        None => normalize_text(&read_stdin()?),
    };

    if text.trim().is_empty() {
        return Err(CommandError::InvalidArgument("input is empty".to_string()).into());
    }

    let outcome = summarizer.summarize_detailed(&text, prompt, budget).await?;
    if let Some(path) = output {
        write_file(path, &outcome.outline)?;
        info!(path = %path.display(), "wrote outline");
    }
    Ok(format_outline(&outcome, format))
}

async fn cmd_flashcards_generate(
    db_path: &Path,
    flashcards: &FlashcardGenerator<'_>,
    identifier: &str,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let (id, course) = resolve_course(&storage, identifier)?;
    ensure_content(&course)?;

    let cards = flashcards.generate(&course.content).await?;
    storage.replace_flashcards(id, &cards)?;
    info!(course_id = id, cards = cards.len(), "stored flashcards");

    Ok(format_flashcards(&cards, format))
}

fn cmd_flashcards_list(db_path: &Path, identifier: &str, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let (id, _) = resolve_course(&storage, identifier)?;
    let cards = storage.get_flashcards(id)?;
    Ok(format_flashcards(&cards, format))
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::MissingArgument("--dir (no home directory found)".to_string())
        })?;

    let written = PromptSet::write_defaults(&dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompts to {}: {e}", dir.display()))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!("Prompt templates already present in {}\n", dir.display()))
            } else {
                let mut output = format!("Wrote {} prompt templates:\n", written.len());
                for path in &written {
                    let _ = writeln!(output, "  {}", path.display());
                }
                Ok(output)
            }
        }
        OutputFormat::Json => Ok(format_json(&serde_json::json!({
            "dir": dir.to_string_lossy(),
            "written": written.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
        }))),
    }
}
