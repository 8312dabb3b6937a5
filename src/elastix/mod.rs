// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! elastix and transformix parameter files.
//!
//! Registration and transformation are driven by plain-text parameter maps.
//! This module reads and writes them and builds the scaling maps used to move
//! between fullstack and downsampled space.

pub mod error;
mod parameter_map;
mod scaling;

pub use error::{ElastixError, ElastixResult};
pub use parameter_map::{ParameterMap, ParameterValue};
pub use scaling::{downsampled_to_fullstack_map, fullstack_to_downsampled_map, scaling_parameter_map};
