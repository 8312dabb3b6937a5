// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // registration engines
pub mod config;        // parameter files + validation
pub mod elastix;       // elastix parameter maps
pub mod errors;        // error handling
pub mod filter;        // prefilter pipelines
pub mod layout;        // resolved run paths
pub mod observability;
pub mod pipeline;      // registration orchestration
pub mod scale;         // sample/CCF scale factors
pub mod traits;        // engine abstraction

#[cfg(test)]
mod test_support;

pub use pipeline::RegistrationPipeline;
pub use traits::Registrar;
