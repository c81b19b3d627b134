//! Error types for the conversion boundary.
//!
//! Parsing and emission are total; only locating and reading input,
//! validating the machining profile and writing programs can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur around a DRL to GCode conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A machining profile field is out of range.
    #[error("invalid machining profile: {0}")]
    InvalidProfile(String),

    /// No input file was given on the command line.
    #[error("no input file specified")]
    MissingInput,

    /// The input file does not exist.
    #[error("specified input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Process exit status reported by the command-line tool.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingInput => 1,
            Self::InputNotFound(_) => 2,
            Self::InvalidProfile(_) | Self::Io { .. } => 3,
        }
    }
}
