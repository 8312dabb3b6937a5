// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod filter;
mod params;
mod pipeline;

pub use config::ValidationError;
pub use filter::FilterError;
pub use params::{ParamsError, ParamsResult, ResourceError};
pub use pipeline::{PipelineError, PipelineResult};
