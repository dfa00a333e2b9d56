//! Error types for study-buddy operations.
//!
//! This module provides the error hierarchy using `thiserror` for storage,
//! chunking, document I/O, text generation, flashcards, and CLI commands.
//!
//! The summary pipeline itself only ever fails with [`GenerationError`]:
//! whatever the generator returns is handed back unchanged.

use thiserror::Error;

/// Result type alias for study-buddy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Chunking-related errors (chunker configuration).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// I/O errors (file reading and document extraction).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Text generation errors (external model call).
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Flashcard generation errors.
    #[error("flashcard error: {0}")]
    Flashcard(#[from] FlashcardError),

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized (init command not run).
    #[error("study-buddy not initialized. Run: study-buddy init")]
    NotInitialized,

    /// Course not found by ID or name.
    #[error("course not found: {identifier}")]
    CourseNotFound {
        /// Course ID or name that was not found.
        identifier: String,
    },

    /// No summary has been generated for the course yet.
    #[error("no summary stored for course {course_id}")]
    SummaryNotFound {
        /// Course the summary was requested for.
        course_id: i64,
    },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Chunking-specific errors.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Chunk size exceeds maximum allowed.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested chunk size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Invalid chunk configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },
}

/// I/O-specific errors for file operations and document extraction.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to create directory.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// File exceeds the extraction size limit.
    #[error("{path} exceeds {limit_mb}MB limit")]
    TooLarge {
        /// Path to the file.
        path: String,
        /// Limit in mebibytes.
        limit_mb: u64,
    },

    /// Unsupported document type.
    #[error("unsupported file type '{extension}': use PDF, DOCX, PPTX or plain text")]
    UnsupportedFormat {
        /// File extension (with leading dot) or the file name.
        extension: String,
    },

    /// Document extraction failed.
    #[error("failed to extract text from {path}: {reason}")]
    ExtractionFailed {
        /// Path to the document.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Extraction succeeded but produced no text.
    #[error("no readable text found in {path}. If it is a scanned PDF, add OCR")]
    NoReadableText {
        /// Path to the document.
        path: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// Errors raised by a text generator.
///
/// These are surfaced unchanged by the summary pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport, authentication, or API-side failure.
    #[error("generation request failed: {0}")]
    Request(String),

    /// The model answered with no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// No usable generator is configured.
    #[error("text generator not configured: {0}")]
    NotConfigured(String),
}

/// Flashcard generation errors.
#[derive(Error, Debug)]
pub enum FlashcardError {
    /// The underlying generation call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The model reply contained no JSON array.
    #[error("model did not return JSON: {0}")]
    MalformedOutput(String),

    /// Fewer usable cards than requested under the `fail` policy.
    #[error("expected {expected} flashcards, model produced {actual}")]
    Shortfall {
        /// Requested card count.
        expected: usize,
        /// Usable cards returned.
        actual: usize,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

// Implement From traits for library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "openai")]
impl From<async_openai::error::OpenAIError> for GenerationError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: test error");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotInitialized;
        assert_eq!(
            err.to_string(),
            "study-buddy not initialized. Run: study-buddy init"
        );

        let err = StorageError::CourseNotFound {
            identifier: "algebra".to_string(),
        };
        assert_eq!(err.to_string(), "course not found: algebra");

        let err = StorageError::SummaryNotFound { course_id: 7 };
        assert_eq!(err.to_string(), "no summary stored for course 7");
    }

    #[test]
    fn test_chunking_error_display() {
        let err = ChunkingError::ChunkTooLarge {
            size: 300_000,
            max: 250_000,
        };
        assert_eq!(err.to_string(), "chunk size 300000 exceeds maximum 250000");
    }

    #[test]
    fn test_io_error_display() {
        let err = IoError::FileNotFound {
            path: "/tmp/test.txt".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/test.txt");

        let err = IoError::TooLarge {
            path: "slides.pdf".to_string(),
            limit_mb: 50,
        };
        assert_eq!(err.to_string(), "slides.pdf exceeds 50MB limit");

        let err = IoError::UnsupportedFormat {
            extension: ".ppt".to_string(),
        };
        assert!(err.to_string().contains(".ppt"));

        let err = IoError::NoReadableText {
            path: "scan.pdf".to_string(),
        };
        assert!(err.to_string().contains("OCR"));
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Request("401 unauthorized".to_string());
        assert!(err.to_string().contains("401 unauthorized"));
        assert_eq!(
            GenerationError::EmptyResponse.to_string(),
            "model returned an empty response"
        );
    }

    #[test]
    fn test_flashcard_error_transparent_generation() {
        let err: FlashcardError = GenerationError::EmptyResponse.into();
        assert_eq!(err.to_string(), "model returned an empty response");

        let err = FlashcardError::Shortfall {
            expected: 10,
            actual: 4,
        };
        assert_eq!(err.to_string(), "expected 10 flashcards, model produced 4");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_generation() {
        let err: Error = GenerationError::EmptyResponse.into();
        assert!(matches!(
            err,
            Error::Generation(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_error_from_command() {
        let cmd_err = CommandError::MissingArgument("--text".to_string());
        let err: Error = cmd_err.into();
        assert!(matches!(err, Error::Command(_)));
        assert!(err.to_string().contains("--text"));
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "bad config".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad config");
    }

    #[test]
    fn test_from_rusqlite_error_to_error() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: Error = rusqlite_err.into();
        assert!(matches!(err, Error::Storage(StorageError::Database(_))));
    }

    #[test]
    fn test_from_serde_json_error_to_storage_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
