//! Error types for chronosort

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chronosort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chronosort
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{path}' not found or not an image: {message}")]
    NotAnImage { path: PathBuf, message: String },

    #[error("Missing metadata field {field} in {path}")]
    MissingMetadataField { path: PathBuf, field: &'static str },

    #[error("Invalid capture time '{value}' in {filename}")]
    InvalidCaptureTime { filename: String, value: String },

    #[error("Shifting timestamp {timestamp} by {offset}s leaves the representable range")]
    TimestampOutOfRange { timestamp: i64, offset: i64 },

    #[error("Reference index {index} is out of range for {len} records")]
    ReferenceIndexOutOfRange { index: usize, len: usize },

    #[error("Input directory does not exist: {0}")]
    InputDirectoryMissing(PathBuf),

    #[error("Output directory does not exist: {0}")]
    OutputDirectoryMissing(PathBuf),

    #[error("Failed to copy {from} to {to}: {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Refusing to overwrite input file {source_file} with {destination}")]
    DestinationIsInput {
        destination: PathBuf,
        source_file: PathBuf,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl Error {
    /// The file is a readable image but its capture metadata is unusable
    pub fn is_missing_metadata(&self) -> bool {
        matches!(
            self,
            Error::MissingMetadataField { .. } | Error::InvalidCaptureTime { .. }
        )
    }
}
