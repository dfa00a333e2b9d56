//! Instruction templates for model calls.
//!
//! Three templates drive every model call: the per-chunk outline prompt,
//! the merge prompt, and the flashcard prompt. Each can be overridden by a
//! file in the prompt directory; missing files fall back to the compiled-in
//! defaults.
//!
//! Templates use `{name}` placeholders: `{section}` and `{point}` (the
//! markers), `{budget}`, `{index}` and `{total}` (chunk position, 1-based),
//! `{instruction}` (the user's extra instruction, or nothing), and
//! `{count}` (number of flashcards).

use std::path::{Path, PathBuf};

use crate::io::unicode::strip_control_chars;
use crate::summarize::MarkerGrammar;

/// Maximum length of a user instruction in characters.
pub const MAX_INSTRUCTION_CHARS: usize = 800;

/// Environment variable naming the prompt directory.
pub const PROMPT_DIR_ENV: &str = "STUDY_BUDDY_PROMPT_DIR";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/study-buddy/prompts";

/// Filename for the chunk outline template.
const CHUNK_FILENAME: &str = "chunk.md";
/// Filename for the merge template.
const MERGE_FILENAME: &str = "merge.md";
/// Filename for the flashcard template.
const FLASHCARDS_FILENAME: &str = "flashcards.md";

/// Default instruction for summarizing one chunk.
pub const CHUNK_PROMPT: &str = r"You turn study material into a compact revision outline.

Write plain text using only two kinds of lines:
{section}Section title
{point}Short, concrete point

Rules:
- No other formatting: no numbering, bold, tables, or code fences.
- Group related points under a section; keep each point to one line.
- Keep definitions, formulas, names, and dates that a student would be tested on.
- Do not invent facts that are not in the text.

The text is part {index} of {total} of the material. The whole outline should come to roughly {budget} characters, so this part should take its fair share of that.
{instruction}";

/// Default instruction for merging per-chunk outlines.
pub const MERGE_PROMPT: &str = r"You merge partial outlines of one document into a single revision outline.

Keep the same two kinds of lines:
{section}Section title
{point}Short, concrete point

Rules:
- Keep the original order of topics.
- Combine sections that cover the same topic and drop repeated points.
- No other formatting: no numbering, bold, tables, or code fences.
- Keep the whole outline under roughly {budget} characters.
{instruction}";

/// Default instruction for flashcard generation.
pub const FLASHCARDS_PROMPT: &str = r#"You create educational flashcards. Keep language simple and clear. Each card has a concise front (prompt) and a helpful back (answer).

From the content you are given, create EXACTLY {count} flashcards. Return ONLY a strict JSON array of objects with keys "front" and "back" (no markdown, no extra text). Front: a short question/fill-in/prompt. Back: a brief but clear answer or explanation."#;

/// Position of a chunk within the text being summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPosition {
    /// 0-based chunk index.
    pub index: usize,
    /// Total number of chunks.
    pub total: usize,
}

/// A set of instruction templates.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from CLI flags, environment variables, or the default path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Per-chunk outline template.
    pub chunk: String,
    /// Merge template.
    pub merge: String,
    /// Flashcard template.
    pub flashcards: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` CLI flag)
    /// 2. `STUDY_BUDDY_PROMPT_DIR` environment variable
    /// 3. `~/.config/study-buddy/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(PROMPT_DIR_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|content| !content.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            chunk: load_file(CHUNK_FILENAME, CHUNK_PROMPT),
            merge: load_file(MERGE_FILENAME, MERGE_PROMPT),
            flashcards: load_file(FLASHCARDS_FILENAME, FLASHCARDS_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            chunk: CHUNK_PROMPT.to_string(),
            merge: MERGE_PROMPT.to_string(),
            flashcards: FLASHCARDS_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (CHUNK_FILENAME, CHUNK_PROMPT),
            (MERGE_FILENAME, MERGE_PROMPT),
            (FLASHCARDS_FILENAME, FLASHCARDS_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }

    /// Renders the instruction for one chunk.
    #[must_use]
    pub fn chunk_instruction(
        &self,
        markers: &MarkerGrammar,
        budget: usize,
        position: ChunkPosition,
        instruction: Option<&str>,
    ) -> String {
        fill(
            &self.chunk,
            &[
                ("section", markers.section().to_string()),
                ("point", markers.point().to_string()),
                ("budget", budget.to_string()),
                ("index", (position.index + 1).to_string()),
                ("total", position.total.to_string()),
                ("instruction", instruction_line(instruction)),
            ],
        )
    }

    /// Renders the merge instruction.
    #[must_use]
    pub fn merge_instruction(
        &self,
        markers: &MarkerGrammar,
        budget: usize,
        instruction: Option<&str>,
    ) -> String {
        fill(
            &self.merge,
            &[
                ("section", markers.section().to_string()),
                ("point", markers.point().to_string()),
                ("budget", budget.to_string()),
                ("instruction", instruction_line(instruction)),
            ],
        )
    }

    /// Renders the flashcard instruction.
    #[must_use]
    pub fn flashcard_instruction(&self, count: usize) -> String {
        fill(&self.flashcards, &[("count", count.to_string())])
    }
}

/// Cleans a user instruction before it is placed in a prompt.
///
/// Control characters are removed (newlines and tabs kept), the result is
/// trimmed and cut to [`MAX_INSTRUCTION_CHARS`]. Blank instructions become
/// `None`.
///
/// # Examples
///
/// ```
/// use study_buddy::prompt::sanitize_instruction;
///
/// assert_eq!(sanitize_instruction(Some(" focus\u{7} on dates ")), Some("focus on dates".to_string()));
/// assert_eq!(sanitize_instruction(Some("   ")), None);
/// ```
#[must_use]
pub fn sanitize_instruction(raw: Option<&str>) -> Option<String> {
    let cleaned = strip_control_chars(raw?);
    let trimmed: String = cleaned.trim().chars().take(MAX_INSTRUCTION_CHARS).collect();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn instruction_line(instruction: Option<&str>) -> String {
    sanitize_instruction(instruction)
        .map(|i| format!("\nAdditional instruction from the student: {i}"))
        .unwrap_or_default()
}

fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let rendered = vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    });
    rendered.trim_end().to_string()
}
