//! Document text extraction and course bundling.
//!
//! Turns source files (plain text, Markdown, PDF, DOCX, PPTX) into
//! normalized text and
//! combines several documents into the content and name of one course.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ooxml::{docx_text, pptx_text};
use super::reader::FileReader;
use crate::core::course::UNTITLED;
use crate::core::Course;
use crate::error::{IoError, Result};
use crate::io::unicode::truncate_chars;

/// Number of source stems shown in a derived course name.
const NAME_STEMS: usize = 3;

/// Kind of source document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain text or Markdown.
    PlainText,
    /// PDF document.
    Pdf,
    /// Word document (Office Open XML).
    Docx,
    /// PowerPoint presentation (Office Open XML).
    Pptx,
}

impl DocumentKind {
    /// Determines the document kind from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" | "markdown" | "text" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            _ => Err(IoError::UnsupportedFormat {
                extension: if ext.is_empty() {
                    path.to_string_lossy().to_string()
                } else {
                    format!(".{ext}")
                },
            }
            .into()),
        }
    }
}

/// Text extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// File name without extension.
    pub stem: String,
    /// Normalized text.
    pub text: String,
}

/// Extracts and normalizes the text of a document.
///
/// # Errors
///
/// Returns an error if the file is missing, over the size limit, of an
/// unsupported type, unreadable, or yields no text after normalization.
pub fn extract_document<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    let path = path.as_ref();
    let kind = DocumentKind::from_path(path)?;
    let reader = FileReader::open(path)?;
    let path_str = reader.path().to_string();

    let bytes = reader.read_to_bytes()?;
    let raw = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| IoError::ExtractionFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?
        }
        DocumentKind::Docx => docx_text(&bytes, &path_str)?,
        DocumentKind::Pptx => pptx_text(&bytes, &path_str)?,
    };

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(IoError::NoReadableText { path: path_str }.into());
    }

    debug!(path = %path_str, ?kind, chars = text.chars().count(), "extracted document");

    Ok(ExtractedDocument {
        stem: file_stem(path),
        text,
    })
}

#[allow(clippy::expect_used)]
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalizes extracted text.
///
/// Converts `\r\n` to `\n`, collapses runs of three or more newlines to
/// two, and trims surrounding whitespace.
///
/// # Examples
///
/// ```
/// use study_buddy::io::normalize_text;
///
/// assert_eq!(normalize_text("  a\r\nb\n\n\n\nc  "), "a\nb\n\nc");
/// ```
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n");
    BLANK_RUNS.replace_all(&unified, "\n\n").trim().to_string()
}

/// Joins documents into one course body.
///
/// Each document becomes `=== FILE: {stem} ===` followed by its text;
/// documents are separated by a blank line.
#[must_use]
pub fn bundle_documents(docs: &[ExtractedDocument]) -> String {
    docs.iter()
        .map(|d| format!("=== FILE: {} ===\n{}", d.stem, d.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Derives a course name.
///
/// An explicit, non-blank name wins. Otherwise the first three stems are
/// joined with `" & "`, with `" (+N more)"` appended when there are more.
/// With no stems the name is `"Untitled"`.
///
/// # Examples
///
/// ```
/// use study_buddy::io::derive_course_name;
///
/// let stems = ["a", "b", "c", "d", "e"].map(String::from);
/// assert_eq!(derive_course_name(None, &stems), "a & b & c (+2 more)");
/// assert_eq!(derive_course_name(Some("Algebra"), &stems), "Algebra");
/// assert_eq!(derive_course_name(None, &[]), "Untitled");
/// ```
#[must_use]
pub fn derive_course_name(explicit: Option<&str>, stems: &[String]) -> String {
    if let Some(name) = explicit.map(str::trim)
        && !name.is_empty()
    {
        return truncate_chars(name, Course::MAX_NAME_CHARS).to_string();
    }

    if stems.is_empty() {
        return UNTITLED.to_string();
    }

    let mut name = stems
        .iter()
        .take(NAME_STEMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" & ");
    if stems.len() > NAME_STEMS {
        let _ = write!(name, " (+{} more)", stems.len() - NAME_STEMS);
    }
    truncate_chars(&name, Course::MAX_NAME_CHARS).to_string()
}

/// Builds a course from a set of source files.
///
/// # Errors
///
/// Fails on the first document that cannot be extracted.
pub fn course_from_files<P: AsRef<Path>>(paths: &[P], name: Option<&str>) -> Result<Course> {
    let docs = paths
        .iter()
        .map(extract_document)
        .collect::<Result<Vec<_>>>()?;
    let stems: Vec<String> = docs.iter().map(|d| d.stem.clone()).collect();
    let course_name = derive_course_name(name, &stems);
    Ok(Course::new(&course_name, bundle_documents(&docs)).with_sources(stems))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
