//! Error types shared by the codec, scene and rasterizer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, composing or rendering a mesh.
#[derive(Debug, Error)]
pub enum Error {
    /// The mesh source does not exist
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A record holds a token that is not a valid number or index
    #[error("Format error on line {line}: {message}")]
    Format { line: usize, message: String },

    /// The operation needs state that has not been set up yet
    #[error("Invalid state: {message}")]
    State { message: String },

    /// Reading or writing the mesh source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a format error for a 1-based line number.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Creates a state error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
