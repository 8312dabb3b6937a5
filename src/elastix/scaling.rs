// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Affine scaling maps between fullstack and downsampled space.
//!
//! Both maps start from the shipped `00_scaling.txt` and only differ in the
//! diagonal of `TransformParameters` and the output `Size`. transformix maps
//! output points to input points, so the fullstack-to-downsampled map scales
//! by the CCF-to-sample factors and vice versa.

use super::ParameterMap;
use crate::config::ImageFormat;
use crate::scale::ScaleFactors;

/// Build an affine scaling map from `base`.
///
/// `factors` become the diagonal of `TransformParameters` (x, y, z, six
/// decimal places, no translation); `size` is the output image size.
pub fn scaling_parameter_map(
    base: &ParameterMap,
    factors: [f64; 3],
    size: [u64; 3],
    format: ImageFormat,
) -> ParameterMap {
    let [fx, fy, fz] = factors;
    let mut map = base.clone();
    map.set_numbers(
        "TransformParameters",
        [fx, 0.0, 0.0, 0.0, fy, 0.0, 0.0, 0.0, fz, 0.0, 0.0, 0.0]
            .iter()
            .map(|value| format!("{:.6}", value)),
    );
    map.set_numbers("Size", size);
    map.set_text("ResultImageFormat", format.extension());
    map
}

/// Map resampling a fullstack image of `fullstack_size` voxels into downsampled space.
pub fn fullstack_to_downsampled_map(
    base: &ParameterMap,
    factors: &ScaleFactors,
    fullstack_size: [u64; 3],
    format: ImageFormat,
) -> ParameterMap {
    scaling_parameter_map(
        base,
        factors.ccf_to_sample,
        factors.downsampled_size(fullstack_size),
        format,
    )
}

/// Map resampling a downsampled image back to `fullstack_size` voxels.
pub fn downsampled_to_fullstack_map(
    base: &ParameterMap,
    factors: &ScaleFactors,
    fullstack_size: [u64; 3],
    format: ImageFormat,
) -> ParameterMap {
    scaling_parameter_map(base, factors.sample_to_ccf, fullstack_size, format)
}
