// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while running the registration pipeline.

use super::{FilterError, ParamsError};
use crate::config::Stage;
use crate::elastix::ElastixError;
use crate::traits::RegistrarError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for every step of a registration run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Parameters could not be loaded, validated or resolved.
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// An elastix parameter file could not be read or written.
    #[error(transparent)]
    Elastix(#[from] ElastixError),

    /// A prefilter selector could not be parsed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The registration engine reported a failure.
    #[error("{stage}: registrar failed to {operation}: {source}")]
    Registrar {
        stage: Stage,
        operation: &'static str,
        #[source]
        source: RegistrarError,
    },

    /// File system operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine returned a different number of transforms than requested.
    #[error("{stage}: expected {expected} transform parameter maps, registrar returned {returned}")]
    TransformCountMismatch {
        stage: Stage,
        expected: usize,
        returned: usize,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn registrar(stage: Stage, operation: &'static str) -> impl FnOnce(RegistrarError) -> Self {
        move |source| PipelineError::Registrar {
            stage,
            operation,
            source,
        }
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
