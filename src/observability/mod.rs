// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for brainregister.
//!
//! Every diagnostic the crate emits is a message struct with a `Display`
//! implementation and a [`StructuredLog`](messages::StructuredLog)
//! implementation that records the same data as `tracing` fields. Call sites
//! build the struct and call `.log()`; no log text lives outside this module.
//!
//! # Organization
//!
//! * `messages::params` - loading, validating and generating parameter files
//! * `messages::pipeline` - registration stages and the artifacts they produce
//!
//! # Usage
//!
//! ```rust
//! use brainregister::observability::messages::pipeline::StageStarted;
//! use brainregister::observability::messages::StructuredLog;
//! use brainregister::config::Stage;
//!
//! brainregister::observability::init_tracing();
//!
//! StageStarted { stage: Stage::DownsampledToCcf }.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Does nothing when a global subscriber is already set, so libraries and
/// tests may call it freely.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
