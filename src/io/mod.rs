//! I/O utilities for study-buddy.
//!
//! Provides file reading with memory mapping support, document text
//! extraction (plain text, PDF, DOCX, PPTX), and Unicode helpers for
//! char-based lengths.

pub mod extract;
mod ooxml;
pub mod reader;
pub mod unicode;

pub use extract::{
    DocumentKind, ExtractedDocument, bundle_documents, course_from_files, derive_course_name,
    extract_document, normalize_text,
};
pub use reader::{FileReader, MAX_DOCUMENT_BYTES, write_file};
