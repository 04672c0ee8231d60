//! Error types for the command-line front end.

use std::path::PathBuf;

use sqlfrag_core::GenerateError;

/// Errors that can occur while compiling a command tree file.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Path of the input, `-` for standard input.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The input is not a valid command tree.
    #[error("Failed to parse command tree '{path}': {source}")]
    Parse {
        /// Path of the input, `-` for standard input.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The command tree could not be lowered to SQL.
    #[error("Generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// The output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
