// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors produced while parsing a filter selector such as `M,4,4,4-GH,10,10,4`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("empty filter expression")]
    Empty,

    #[error("empty step at position {0}")]
    EmptyStep(usize),

    #[error("unknown filter code '{code}' in step '{step}' (expected M, G or GH)")]
    UnknownCode { code: String, step: String },

    #[error("step '{step}' needs 3 kernel values, found {found}")]
    KernelArity { step: String, found: usize },

    #[error("step '{step}' has a non-integer kernel value '{value}'")]
    KernelValue { step: String, value: String },
}
