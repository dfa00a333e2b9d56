//! File reading utilities with memory mapping support.
//!
//! Source documents are capped at [`MAX_DOCUMENT_BYTES`]; files past the
//! mmap threshold are mapped rather than streamed into a buffer.

// Memory mapping requires unsafe but is well-documented and safe for read-only access
#![allow(unsafe_code)]

use crate::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Threshold for using memory mapping (1MB).
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Maximum size of a single source document (50MB).
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// File reader with support for memory mapping.
///
/// Automatically chooses the best reading strategy based on file size:
/// - Small files (< 1MB): Read directly into memory
/// - Large files (>= 1MB): Use memory mapping
///
/// # Examples
///
/// ```no_run
/// use study_buddy::io::FileReader;
///
/// let reader = FileReader::open("lecture-notes.md").unwrap();
/// let content = reader.read_to_string().unwrap();
/// ```
pub struct FileReader {
    /// File handle.
    file: File,
    /// File size in bytes.
    size: u64,
    /// File path for error messages.
    path: String,
}

impl FileReader {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be opened, or is
    /// larger than [`MAX_DOCUMENT_BYTES`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_limit(path, MAX_DOCUMENT_BYTES)
    }

    /// Opens a file for reading, rejecting files over `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be opened, or is
    /// larger than `limit`.
    pub fn open_with_limit<P: AsRef<Path>>(path: P, limit: u64) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        if !path_ref.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }

        let file = File::open(path_ref).map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        let size = file
            .metadata()
            .map_err(|e| IoError::ReadFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?
            .len();

        if size > limit {
            return Err(IoError::TooLarge {
                path: path_str,
                limit_mb: limit / (1024 * 1024),
            }
            .into());
        }

        Ok(Self {
            file,
            size,
            path: path_str,
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the file content as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or content is not valid UTF-8.
    pub fn read_to_string(&self) -> Result<String> {
        let bytes = self.read_to_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            IoError::ReadFailed {
                path: self.path.clone(),
                reason: format!("invalid UTF-8: {e}"),
            }
            .into()
        })
    }

    /// Reads the file content as bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn read_to_bytes(&self) -> Result<Vec<u8>> {
        if self.size >= MMAP_THRESHOLD {
            self.read_mmap_bytes()
        } else {
            self.read_direct_bytes()
        }
    }

    fn read_mmap_bytes(&self) -> Result<Vec<u8>> {
        // Safety: We're only reading from the file, which is safe
        let mmap = unsafe {
            Mmap::map(&self.file).map_err(|e| IoError::MmapFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(mmap.to_vec())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_direct_bytes(&self) -> Result<Vec<u8>> {
        let mut file = &self.file;
        let mut buffer = Vec::with_capacity(self.size as usize);
        file.read_to_end(&mut buffer)
            .map_err(|e| IoError::ReadFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(buffer)
    }
}

/// Writes content to a file, creating parent directories if needed.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| IoError::DirectoryFailed {
            path: parent.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    }

    std::fs::write(path_ref, content).map_err(|e| IoError::WriteFailed {
        path: path_str,
        reason: e.to_string(),
    })?;

    Ok(())
}
