//! Error types for flpzip.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for flpzip operations.
pub type Result<T> = std::result::Result<T, FlpZipError>;

/// Errors that can occur while reading a project or writing its bundle.
#[derive(Error, Debug)]
pub enum FlpZipError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project path: {path}")]
    InvalidProjectPath { path: PathBuf },

    // Project Format Errors
    #[error("Not an FL Studio project: expected {expected} chunk, found {found:?}")]
    InvalidMagic { expected: &'static str, found: [u8; 4] },

    #[error("Invalid FLP header length: {length} (expected 6)")]
    InvalidHeaderLength { length: u32 },

    #[error("Unexpected end of project data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Invalid text in event {event_id}: {reason}")]
    InvalidText { event_id: u8, reason: String },

    // Archive Errors
    #[error("Archive error: {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlpZipError {
    /// Short machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            FlpZipError::FileNotFound { .. } => "FILE_NOT_FOUND",
            FlpZipError::FileReadError { .. } => "FILE_READ_ERROR",
            FlpZipError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            FlpZipError::InvalidProjectPath { .. } => "INVALID_PROJECT_PATH",
            FlpZipError::InvalidMagic { .. } => "INVALID_MAGIC",
            FlpZipError::InvalidHeaderLength { .. } => "INVALID_HEADER",
            FlpZipError::UnexpectedEof { .. } => "UNEXPECTED_EOF",
            FlpZipError::InvalidText { .. } => "INVALID_TEXT",
            FlpZipError::Archive { .. } => "ARCHIVE_ERROR",
            FlpZipError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FlpZipError::FileNotFound { .. } => Some("Check the project path and try again."),
            FlpZipError::InvalidMagic { .. } | FlpZipError::InvalidHeaderLength { .. } => {
                Some("Make sure the file is an .flp project saved by FL Studio.")
            }
            FlpZipError::UnexpectedEof { .. } => {
                Some("The project looks truncated. Re-save it from FL Studio.")
            }
            FlpZipError::FileWriteError { .. } | FlpZipError::Archive { .. } => {
                Some("Check write permissions and free space in the project directory.")
            }
            _ => None,
        }
    }
}
