// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for parameter file events.
//!
//! This module contains message types for logging events related to:
//! * Loading parameter files
//! * Validation failures
//! * Generating a parameters file for a new sample

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Parameters file parsed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ParamsLoaded<'a> {
    pub path: &'a Path,
    pub sample_images: usize,
}

impl Display for ParamsLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded parameters from {} ({} sample images)",
            self.path.display(),
            self.sample_images
        )
    }
}

impl StructuredLog for ParamsLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            sample_images = self.sample_images,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "params",
            span_name = name,
            path = %self.path.display(),
            sample_images = self.sample_images,
        )
    }
}

/// A single validation problem in a parameters file.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use brainregister::errors::ValidationError;
/// use brainregister::observability::messages::params::ValidationFailed;
///
/// let error = ValidationError::EmptyValue { key: "sample-template-path".to_string() };
/// let msg = ValidationFailed { error: &error };
///
/// assert_eq!(msg.to_string(), "Invalid parameters: Value for 'sample-template-path' must not be empty");
/// ```
pub struct ValidationFailed<'a> {
    pub error: &'a ValidationError,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invalid parameters: {}", self.error)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "validation",
            span_name = name,
            error = %self.error,
        )
    }
}

/// A new parameters file was written for a sample.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ParamsFileWritten<'a> {
    pub path: &'a Path,
    pub sample_template: &'a Path,
    pub sample_images: usize,
}

impl Display for ParamsFileWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wrote parameters file {} for sample template {} with {} sample images",
            self.path.display(),
            self.sample_template.display(),
            self.sample_images
        )
    }
}

impl StructuredLog for ParamsFileWritten<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            sample_template = %self.sample_template.display(),
            sample_images = self.sample_images,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "params",
            span_name = name,
            path = %self.path.display(),
            sample_template = %self.sample_template.display(),
        )
    }
}

/// An output directory was created.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct OutputDirCreated<'a> {
    pub path: &'a Path,
}

impl Display for OutputDirCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created output directory {}", self.path.display())
    }
}

impl StructuredLog for OutputDirCreated<'_> {
    fn log(&self) {
        tracing::debug!(path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("output_dir", span_name = name, path = %self.path.display())
    }
}
