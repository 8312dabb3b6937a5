// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading, resolving and writing parameter files.

use super::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve a `brainregister:` resource reference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The name after `brainregister:` is not a known built-in resource.
    #[error("Unknown built-in resource 'brainregister:{0}'")]
    UnknownBuiltin(String),

    /// A `brainregister:resource/...` path is absolute or leaves the resource root.
    #[error("Resource path '{0}' must stay inside the brainregister resources directory")]
    EscapesRoot(String),
}

/// Errors raised while reading, resolving or generating parameter files.
#[derive(Error, Debug)]
pub enum ParamsError {
    /// File could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML for the expected schema.
    #[error("Could not parse '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Parameters could not be serialized back to YAML.
    #[error("Could not serialize parameters: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// A path reference could not be resolved.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The sample template given for a new parameters file is not a file.
    #[error("Sample template is not a valid image file: {0}")]
    InvalidSampleTemplate(PathBuf),

    /// One or more validation rules failed.
    #[error("Parameter validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ParamsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParamsError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias for parameter file operations.
pub type ParamsResult<T> = Result<T, ParamsError>;
