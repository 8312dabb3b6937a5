// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt;

/// One phase of the brainregister workflow.
///
/// Each stage owns a group of `<stage>-*` keys in the parameters file and an
/// output directory. The declaration order is the order [`Stage::ALL`] lists
/// them in, which is also the order the keys appear in a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    FullstackToDownsampled,
    DownsampledToFullstack,
    DownsampledToCcf,
    CcfToDownsampled,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::FullstackToDownsampled,
        Stage::DownsampledToFullstack,
        Stage::DownsampledToCcf,
        Stage::CcfToDownsampled,
    ];

    /// Key prefix used by this stage in the parameters file.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Stage::FullstackToDownsampled => "fullstack-to-downsampled",
            Stage::DownsampledToFullstack => "downsampled-to-fullstack",
            Stage::DownsampledToCcf => "downsampled-to-ccf",
            Stage::CcfToDownsampled => "ccf-to-downsampled",
        }
    }

    /// Full key name for a stage field, e.g. `downsampled-to-ccf-prefix`.
    pub fn key(&self, field: &str) -> String {
        format!("{}-{}", self.key_prefix(), field)
    }

    /// Stage owning a top-level key, if any.
    pub fn for_key(key: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| key.starts_with(stage.key_prefix()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}
