// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with its fields attached, at the
//! level documented on the type.
//!
//! # Usage Pattern
//!
//! ```rust
//! use brainregister::observability::messages::params::ParamsLoaded;
//! use brainregister::observability::messages::StructuredLog;
//! use std::path::Path;
//!
//! let msg = ParamsLoaded {
//!     path: Path::new("brainregister/brainregister_parameters.yaml"),
//!     sample_images: 2,
//! };
//!
//! assert_eq!(
//!     msg.to_string(),
//!     "Loaded parameters from brainregister/brainregister_parameters.yaml (2 sample images)"
//! );
//! msg.log();
//! ```

use tracing::Span;

pub mod params;
pub mod pipeline;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Open a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
