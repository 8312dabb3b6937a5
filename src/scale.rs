// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Resolution;
use serde::Serialize;

/// Per-axis ratios between sample and CCF voxel sizes.
///
/// Values are rounded to six decimal places, the precision written into
/// elastix parameter maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactors {
    /// `sample_resolution / ccf_resolution`, x, y, z
    pub sample_to_ccf: [f64; 3],
    /// `ccf_resolution / sample_resolution`, x, y, z
    pub ccf_to_sample: [f64; 3],
}

impl ScaleFactors {
    pub fn new(sample: &Resolution, ccf: &Resolution) -> Self {
        let sample = [sample.x_um, sample.y_um, sample.z_um];
        let ccf = [ccf.x_um, ccf.y_um, ccf.z_um];
        Self {
            sample_to_ccf: std::array::from_fn(|i| round6(sample[i] / ccf[i])),
            ccf_to_sample: std::array::from_fn(|i| round6(ccf[i] / sample[i])),
        }
    }

    /// Size of the downsampled image for a fullstack image of `size` voxels.
    ///
    /// Halves round to even, matching the adaptive filter kernel.
    pub fn downsampled_size(&self, size: [u64; 3]) -> [u64; 3] {
        std::array::from_fn(|i| (size[i] as f64 * self.sample_to_ccf[i]).round_ties_even() as u64)
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
