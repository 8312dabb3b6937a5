// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for reading and writing elastix parameter files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElastixError {
    /// File could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not a `(Key value ...)` entry, a comment or blank.
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// Syntax error inside a named file.
    #[error("Malformed elastix parameter file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: Box<ElastixError>,
    },
}

impl ElastixError {
    pub(crate) fn syntax(line: usize, reason: impl Into<String>) -> Self {
        ElastixError::Syntax {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for elastix parameter file operations.
pub type ElastixResult<T> = Result<T, ElastixError>;
