//! Error types for build history operations.

use std::path::PathBuf;

/// Errors raised by the history table, its file format and its configuration.
///
/// Only directory preconditions and write failures reach the caller of
/// [`crate::TargetHistoryTable`]. Parse errors of an existing history file
/// are logged and turned into an empty table.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The output directory does not exist
    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// The output path exists but is not a directory
    #[error("Output directory is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The empty history file could not be created
    #[error("Can't create history file {}: {source}", .path.display())]
    CreateHistoryFile {
        /// History file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Reading or writing a file failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path that caused the error
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The history file is malformed
    #[error("Malformed history at line {line}, column {column}: {message}")]
    Parse {
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
        /// What went wrong
        message: String,
    },

    /// The XML writer failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The history document parsed but does not follow the record schema
    #[error("Invalid history record: {0}")]
    InvalidRecord(String),

    /// A configuration file could not be read or deserialized
    #[error("Failed to load configuration {}: {message}", .path.display())]
    Config {
        /// Configuration file path
        path: PathBuf,
        /// Description of the failure
        message: String,
    },

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
