// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while validating brainregister parameter files
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A resolution axis is zero, negative or not a finite number
    InvalidResolution {
        /// Full key of the axis, e.g. `sample-template-resolution.x-um`
        key: String,
        value: f64,
    },
    /// An orientation code is not made of one letter per anatomical axis
    MalformedOrientation {
        key: String,
        code: String,
        reason: String,
    },
    /// A required string value is empty
    EmptyValue { key: String },
    /// A registration phase has no elastix parameter files
    MissingParameterFiles { stage: String },
    /// The number of elastix parameter files and output transform files differ
    ParameterFilesMismatch {
        stage: String,
        parameters_files: usize,
        transform_params_filenames: usize,
    },
    /// A transform parameter file name is used twice
    DuplicateTransformParamsFilename { stage: String, filename: String },
    /// A transform parameter file name contains a directory component
    InvalidTransformParamsFilename { key: String, filename: String },
    /// A prefilter expression could not be parsed
    InvalidFilter {
        key: String,
        expression: String,
        reason: String,
    },
    /// Two phases write into the same output directory
    SharedOutputDirectory {
        first_key: String,
        second_key: String,
        path: String,
    },
    /// An input file referenced by the parameters does not exist
    MissingInput {
        description: String,
        path: PathBuf,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidResolution { key, value } => {
                if *value == 0.0 {
                    write!(f, "Image resolution '{}' is not set", key)
                } else {
                    write!(
                        f,
                        "Image resolution '{}' must be a positive number, got {}",
                        key, value
                    )
                }
            }
            ValidationError::MalformedOrientation { key, code, reason } => {
                write!(f, "Orientation '{}' in '{}' is malformed: {}", code, key, reason)
            }
            ValidationError::EmptyValue { key } => {
                write!(f, "Value for '{}' must not be empty", key)
            }
            ValidationError::MissingParameterFiles { stage } => {
                write!(f, "{}: no elastix parameters-files given", stage)
            }
            ValidationError::ParameterFilesMismatch {
                stage,
                parameters_files,
                transform_params_filenames,
            } => {
                write!(
                    f,
                    "{}: transform-params-filenames ({}) and parameters-files ({}) are not equal in length",
                    stage, transform_params_filenames, parameters_files
                )
            }
            ValidationError::DuplicateTransformParamsFilename { stage, filename } => {
                write!(
                    f,
                    "{}: transform params filename '{}' is used more than once",
                    stage, filename
                )
            }
            ValidationError::InvalidTransformParamsFilename { key, filename } => {
                write!(
                    f,
                    "Transform params filename '{}' in '{}' must be a plain file name",
                    filename, key
                )
            }
            ValidationError::InvalidFilter {
                key,
                expression,
                reason,
            } => {
                write!(f, "Filter '{}' in '{}' is invalid: {}", expression, key, reason)
            }
            ValidationError::SharedOutputDirectory {
                first_key,
                second_key,
                path,
            } => {
                write!(
                    f,
                    "'{}' and '{}' both write to output directory '{}'",
                    first_key, second_key, path
                )
            }
            ValidationError::MissingInput { description, path } => {
                write!(f, "{} does not exist: {}", description, path.display())
            }
        }
    }
}

impl std::error::Error for ValidationError {}
