// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Filter selector strings.
//!
//! A prefilter is written as `none`, `adaptive`, or a pipeline of steps joined
//! with `-`, each step being a filter code followed by three kernel values for
//! the x, y and z axes:
//!
//! ```text
//! M,1,1,0-GH,10,10,4   median radius 1x1x0, then gaussian high-pass sigma 10x10x4
//! ```
//!
//! The filters themselves run inside the registration engine; this module only
//! parses, builds and prints the selectors handed to it.

use crate::config::consts::{ADAPTIVE_FILTER, FILTER_ADAPTIVE, FILTER_NONE};
use crate::errors::FilterError;
use crate::scale::ScaleFactors;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Image filter applied by one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `M` - median filter, kernel is the radius
    Median,
    /// `G` - recursive gaussian smoothing, kernel is sigma
    Gaussian,
    /// `GH` - gaussian high-pass, kernel is sigma
    GaussianHighPass,
}

impl FilterKind {
    pub fn code(&self) -> &'static str {
        match self {
            FilterKind::Median => "M",
            FilterKind::Gaussian => "G",
            FilterKind::GaussianHighPass => "GH",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(FilterKind::Median),
            "G" => Some(FilterKind::Gaussian),
            "GH" => Some(FilterKind::GaussianHighPass),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStep {
    pub kind: FilterKind,
    /// x, y, z
    pub kernel: [u32; 3],
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.kernel;
        write!(f, "{},{},{},{}", self.kind.code(), x, y, z)
    }
}

impl FromStr for FilterStep {
    type Err = FilterError;

    fn from_str(step: &str) -> Result<Self, Self::Err> {
        let mut parts = step.split(',').map(str::trim);
        let code = parts.next().unwrap_or_default();
        let kind = FilterKind::from_code(code).ok_or_else(|| FilterError::UnknownCode {
            code: code.to_string(),
            step: step.to_string(),
        })?;

        let values: Vec<&str> = parts.collect();
        if values.len() != 3 {
            return Err(FilterError::KernelArity {
                step: step.to_string(),
                found: values.len(),
            });
        }

        let mut kernel = [0u32; 3];
        for (slot, value) in kernel.iter_mut().zip(values) {
            *slot = value.parse().map_err(|_| FilterError::KernelValue {
                step: step.to_string(),
                value: value.to_string(),
            })?;
        }

        Ok(FilterStep { kind, kernel })
    }
}

/// Ordered list of filter steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPipeline {
    steps: Vec<FilterStep>,
}

impl FilterPipeline {
    pub fn new(steps: Vec<FilterStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    /// Median filter used before scaling fullstack images into downsampled space.
    ///
    /// The radius on each axis is half the CCF-to-sample scale factor, rounded
    /// half to even, so roughly one kernel spans the voxels merged into a
    /// single downsampled voxel.
    pub fn adaptive_downsampling(factors: &ScaleFactors) -> Self {
        let radius = |factor: f64| (factor / 2.0).round_ties_even().max(0.0) as u32;
        let [x, y, z] = factors.ccf_to_sample;
        FilterPipeline::new(vec![FilterStep {
            kind: FilterKind::Median,
            kernel: [radius(x), radius(y), radius(z)],
        }])
    }
}

impl fmt::Display for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for FilterPipeline {
    type Err = FilterError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(FilterError::Empty);
        }
        let steps = expression
            .split('-')
            .enumerate()
            .map(|(i, step)| {
                if step.trim().is_empty() {
                    Err(FilterError::EmptyStep(i))
                } else {
                    step.parse()
                }
            })
            .collect::<Result<Vec<FilterStep>, _>>()?;
        Ok(FilterPipeline { steps })
    }
}

impl Serialize for FilterPipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `prefilter` value from the parameters file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelector {
    /// `none`
    Disabled,
    /// `adaptive` or an explicit pipeline
    Pipeline(FilterPipeline),
}

impl FilterSelector {
    pub fn pipeline(&self) -> Option<&FilterPipeline> {
        match self {
            FilterSelector::Disabled => None,
            FilterSelector::Pipeline(pipeline) => Some(pipeline),
        }
    }
}

impl FromStr for FilterSelector {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            FILTER_NONE => Ok(FilterSelector::Disabled),
            FILTER_ADAPTIVE => Ok(FilterSelector::Pipeline(ADAPTIVE_FILTER.parse()?)),
            expression => Ok(FilterSelector::Pipeline(expression.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_step_pipeline() {
        let pipeline: FilterPipeline = "M,1,1,0-GH,10,10,4".parse().unwrap();
        assert_eq!(
            pipeline.steps(),
            &[
                FilterStep {
                    kind: FilterKind::Median,
                    kernel: [1, 1, 0]
                },
                FilterStep {
                    kind: FilterKind::GaussianHighPass,
                    kernel: [10, 10, 4]
                },
            ]
        );
        assert_eq!(pipeline.to_string(), "M,1,1,0-GH,10,10,4");
    }

    #[test]
    fn selector_keywords() {
        assert_eq!("none".parse::<FilterSelector>().unwrap(), FilterSelector::Disabled);

        let adaptive = "adaptive".parse::<FilterSelector>().unwrap();
        assert_eq!(adaptive.pipeline().unwrap().to_string(), "M,4,4,4");
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<FilterPipeline>(), Err(FilterError::Empty));
        assert_eq!("M,1,1,1-".parse::<FilterPipeline>(), Err(FilterError::EmptyStep(1)));
        assert!(matches!(
            "X,1,1,1".parse::<FilterPipeline>(),
            Err(FilterError::UnknownCode { code, .. }) if code == "X"
        ));
        assert!(matches!(
            "G,1,1".parse::<FilterPipeline>(),
            Err(FilterError::KernelArity { found: 2, .. })
        ));
        assert!(matches!(
            "G,1,a,1".parse::<FilterPipeline>(),
            Err(FilterError::KernelValue { value, .. }) if value == "a"
        ));
    }

    #[test]
    fn adaptive_downsampling_rounds_half_to_even() {
        let factors = ScaleFactors {
            sample_to_ccf: [0.16, 0.16, 0.4],
            ccf_to_sample: [6.25, 5.0, 2.5],
        };
        let pipeline = FilterPipeline::adaptive_downsampling(&factors);
        assert_eq!(pipeline.to_string(), "M,3,2,1");
    }
}
