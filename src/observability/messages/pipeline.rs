// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for registration pipeline events.
//!
//! This module contains message types for logging events related to:
//! * Stage lifecycle
//! * Artifacts found on disk, produced, or skipped
//! * Registration passes run by the engine

use crate::config::Stage;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// A pipeline stage started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use brainregister::config::Stage;
/// use brainregister::observability::messages::pipeline::StageStarted;
///
/// let msg = StageStarted { stage: Stage::CcfToDownsampled };
/// assert_eq!(msg.to_string(), "Starting stage ccf-to-downsampled");
/// ```
pub struct StageStarted {
    pub stage: Stage,
}

impl Display for StageStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Starting stage {}", self.stage)
    }
}

impl StructuredLog for StageStarted {
    fn log(&self) {
        tracing::info!(stage = %self.stage, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stage", span_name = name, stage = %self.stage)
    }
}

/// An artifact already exists and is loaded instead of recomputed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ArtifactExists<'a> {
    pub stage: Stage,
    pub path: &'a Path,
}

impl Display for ArtifactExists<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}: {} exists, loading it", self.stage, self.path.display())
    }
}

impl StructuredLog for ArtifactExists<'_> {
    fn log(&self) {
        tracing::info!(stage = %self.stage, path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "artifact",
            span_name = name,
            stage = %self.stage,
            path = %self.path.display(),
        )
    }
}

/// An artifact was computed and written.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ArtifactSaved<'a> {
    pub stage: Stage,
    pub path: &'a Path,
}

impl Display for ArtifactSaved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}: saved {}", self.stage, self.path.display())
    }
}

impl StructuredLog for ArtifactSaved<'_> {
    fn log(&self) {
        tracing::info!(stage = %self.stage, path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "artifact",
            span_name = name,
            stage = %self.stage,
            path = %self.path.display(),
        )
    }
}

/// An artifact is not written because its `save-*` key is false.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ArtifactNotRequested<'a> {
    pub stage: Stage,
    pub artifact: &'a str,
}

impl Display for ArtifactNotRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}: {} not requested, skipping", self.stage, self.artifact)
    }
}

impl StructuredLog for ArtifactNotRequested<'_> {
    fn log(&self) {
        tracing::debug!(stage = %self.stage, artifact = self.artifact, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "artifact",
            span_name = name,
            stage = %self.stage,
            artifact = self.artifact,
        )
    }
}

/// The registration engine is about to register two images.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RegistrationStarted<'a> {
    pub stage: Stage,
    pub registrar: &'a str,
    pub passes: usize,
    pub prefilter: Option<&'a str>,
}

impl Display for RegistrationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: registering with {} ({} passes, prefilter {})",
            self.stage,
            self.registrar,
            self.passes,
            self.prefilter.unwrap_or("none")
        )
    }
}

impl StructuredLog for RegistrationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            stage = %self.stage,
            registrar = self.registrar,
            passes = self.passes,
            prefilter = self.prefilter.unwrap_or("none"),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registration",
            span_name = name,
            stage = %self.stage,
            registrar = self.registrar,
            passes = self.passes,
        )
    }
}

/// Registration finished and its transform parameter files were written.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RegistrationCompleted {
    pub stage: Stage,
    pub transforms: usize,
    pub duration: Duration,
}

impl Display for RegistrationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: registration produced {} transforms in {:?}",
            self.stage, self.transforms, self.duration
        )
    }
}

impl StructuredLog for RegistrationCompleted {
    fn log(&self) {
        tracing::info!(
            stage = %self.stage,
            transforms = self.transforms,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registration",
            span_name = name,
            stage = %self.stage,
            transforms = self.transforms,
        )
    }
}

/// Every transform parameter file of a registration exists, so it is skipped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RegistrationSkipped {
    pub stage: Stage,
    pub transforms: usize,
}

impl Display for RegistrationSkipped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: all {} transform parameter files exist, skipping registration",
            self.stage, self.transforms
        )
    }
}

impl StructuredLog for RegistrationSkipped {
    fn log(&self) {
        tracing::info!(stage = %self.stage, transforms = self.transforms, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("registration", span_name = name, stage = %self.stage)
    }
}
