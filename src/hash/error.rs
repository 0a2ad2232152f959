// Centralized error handling module
// Error kinds for hashing, enumeration and baseline persistence

use std::io;
use std::path::{Path, PathBuf};

/// Main error type for checksum operations
/// Every message ends with a suggestion line for the person running the tool
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("File not found: {}\nSuggestion: Check that the file path is correct and the file exists", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Directory not found: {}\nSuggestion: Check that the directory path is correct and the directory exists", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied while {operation} {}\nSuggestion: Check file permissions or run with appropriate privileges", .path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    #[error("I/O error while {operation}{}: {source}\nSuggestion: Check file permissions and disk space", describe_path(.path.as_deref()))]
    IoError {
        path: Option<PathBuf>,
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported hash algorithm: {algorithm}\nSuggestion: Use the 'list' command to see available algorithms")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Checksum baseline not found: {}\nSuggestion: Save a baseline first using the 'save' command", .path.display())]
    BaselineNotFound { path: PathBuf },

    #[error("Error parsing checksum baseline {} at line {line}: {reason}\nSuggestion: The baseline must be a JSON object mapping file paths to hex digests", .path.display())]
    BaselineParseError {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to write checksum baseline {}: {reason}\nSuggestion: Check disk space and write permissions", .path.display())]
    BaselineWriteError { path: PathBuf, reason: String },

    #[error("Invalid configuration {}: {reason}\nSuggestion: Check the configuration file against the documented keys", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Result alias for checksum operations
pub type Result<T> = std::result::Result<T, ChecksumError>;

fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

impl ChecksumError {
    /// Create an error from an io::Error, keeping the operation and path as context
    /// NotFound and PermissionDenied get their own variants when a path is known
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(p)) => {
                if operation.contains("directory") {
                    ChecksumError::DirectoryNotFound { path: p }
                } else {
                    ChecksumError::FileNotFound { path: p }
                }
            }
            (io::ErrorKind::PermissionDenied, Some(p)) => ChecksumError::PermissionDenied {
                path: p,
                operation: operation.to_string(),
            },
            (_, path) => ChecksumError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// True for errors raised while loading a baseline
    /// Callers use this to tell a failed comparison apart from a clean one
    pub fn is_baseline_error(&self) -> bool {
        matches!(
            self,
            ChecksumError::BaselineNotFound { .. } | ChecksumError::BaselineParseError { .. }
        )
    }
}

impl From<io::Error> for ChecksumError {
    fn from(err: io::Error) -> Self {
        ChecksumError::from_io_error(err, "unknown operation", None)
    }
}
