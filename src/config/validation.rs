// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of brainregister parameter files.
//!
//! Deserialization already guarantees the shape of the file (every key present
//! with the right type, `save-image-type` one of `nrrd`, `tiff`, `mhd`). The
//! checks here cover what the type system cannot:
//!
//! 1. **Resolution**: every sample axis is a positive, finite number. `0.0` is
//!    what a freshly generated file contains and means "not set yet".
//! 2. **Orientation**: the orientation code names each anatomical axis once.
//! 3. **Required values**: paths and transform file names are non-empty.
//! 4. **Registration phases**: each has at least one elastix parameters file and
//!    exactly one output transform file per parameters file.
//! 5. **Prefilters**: `none`, `adaptive`, or a parseable filter pipeline.
//! 6. **Output layout**: phases do not share an output directory and transform
//!    file names are plain, unique file names.
//!
//! All checks run; errors are accumulated so a user sees every problem with a
//! file in one pass.
//!
//! ```rust
//! use brainregister::config::{validate_params, BrainRegisterParams};
//!
//! let yaml = std::fs::read_to_string(
//!     concat!(env!("CARGO_MANIFEST_DIR"), "/resources/brainregister_parameters.yaml"),
//! ).unwrap();
//! let params = BrainRegisterParams::from_yaml_str(&yaml).unwrap();
//!
//! // The shipped template leaves the sample path and resolution unset.
//! let errors = validate_params(&params).unwrap_err();
//! assert!(errors.len() >= 4);
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::config::{BrainRegisterParams, Orientation, Resolution, Stage};
use crate::errors::ValidationError;
use crate::filter::FilterSelector;
use crate::observability::messages::params::ValidationFailed;
use crate::observability::messages::StructuredLog;

/// Validates brainregister parameters.
///
/// # Returns
///
/// * `Ok(())` - parameters are consistent and can be resolved
/// * `Err(Vec<ValidationError>)` - every problem found, in file order
pub fn validate_params(params: &BrainRegisterParams) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(validate_sample_template(params));
    errors.extend(validate_required_values(params));
    errors.extend(validate_registration_phases(params));
    errors.extend(validate_prefilters(params));
    errors.extend(validate_output_layout(params));

    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            ValidationFailed { error }.log();
        }
        Err(errors)
    }
}

/// Check that every axis of a resolution is a positive, finite number.
pub(crate) fn check_resolution(key: &str, resolution: &Resolution) -> Vec<ValidationError> {
    resolution
        .axes()
        .into_iter()
        .filter(|(_, value)| !(value.is_finite() && *value > 0.0))
        .map(|(axis, value)| ValidationError::InvalidResolution {
            key: format!("{}.{}", key, axis),
            value,
        })
        .collect()
}

fn validate_sample_template(params: &BrainRegisterParams) -> Vec<ValidationError> {
    let mut errors = check_resolution("sample-template-resolution", &params.sample.resolution);

    if let Err(reason) = params.sample.orientation.parse::<Orientation>() {
        errors.push(ValidationError::MalformedOrientation {
            key: "sample-template-orientation".to_string(),
            code: params.sample.orientation.clone(),
            reason,
        });
    }

    errors
}

/// Required string values, keyed by their full YAML key.
fn required_values(params: &BrainRegisterParams) -> Vec<(String, &str)> {
    let fs_ds = &params.fullstack_to_downsampled;
    let ds_fs = &params.downsampled_to_fullstack;
    vec![
        ("sample-template-path".to_string(), params.sample.template_path.as_str()),
        (Stage::FullstackToDownsampled.key("path"), fs_ds.path.as_str()),
        (
            Stage::FullstackToDownsampled.key("transform-params-filename"),
            fs_ds.transform_params_filename.as_str(),
        ),
        (Stage::DownsampledToFullstack.key("path"), ds_fs.path.as_str()),
        (
            Stage::DownsampledToFullstack.key("transform-params-filename"),
            ds_fs.transform_params_filename.as_str(),
        ),
        (Stage::DownsampledToCcf.key("path"), params.downsampled_to_ccf.path.as_str()),
        (Stage::CcfToDownsampled.key("path"), params.ccf_to_downsampled.path.as_str()),
    ]
}

fn validate_required_values(params: &BrainRegisterParams) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = required_values(params)
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| ValidationError::EmptyValue { key })
        .collect();

    for (index, image) in params.sample.images.iter().enumerate() {
        if image.trim().is_empty() {
            errors.push(ValidationError::EmptyValue {
                key: format!("sample-images[{}]", index),
            });
        }
    }

    errors
}

/// Registration phases: `(stage, parameters files count, transform filenames)`.
fn registration_phases(params: &BrainRegisterParams) -> [(Stage, usize, &[String]); 2] {
    [
        (
            Stage::DownsampledToCcf,
            params.downsampled_to_ccf.parameters_files.len(),
            params.downsampled_to_ccf.transform_params_filenames.as_slice(),
        ),
        (
            Stage::CcfToDownsampled,
            params.ccf_to_downsampled.parameters_files.len(),
            params.ccf_to_downsampled.transform_params_filenames.as_slice(),
        ),
    ]
}

fn validate_registration_phases(params: &BrainRegisterParams) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (stage, parameters_files, filenames) in registration_phases(params) {
        if parameters_files == 0 {
            errors.push(ValidationError::MissingParameterFiles {
                stage: stage.to_string(),
            });
        } else if parameters_files != filenames.len() {
            errors.push(ValidationError::ParameterFilesMismatch {
                stage: stage.to_string(),
                parameters_files,
                transform_params_filenames: filenames.len(),
            });
        }
    }

    errors
}

fn validate_prefilters(params: &BrainRegisterParams) -> Vec<ValidationError> {
    [
        (Stage::DownsampledToCcf, &params.downsampled_to_ccf.prefilter),
        (Stage::CcfToDownsampled, &params.ccf_to_downsampled.prefilter),
    ]
    .into_iter()
    .filter_map(|(stage, expression)| {
        expression
            .parse::<FilterSelector>()
            .err()
            .map(|e| ValidationError::InvalidFilter {
                key: stage.key("prefilter"),
                expression: expression.clone(),
                reason: e.to_string(),
            })
    })
    .collect()
}

/// Output directories must be distinct, and transform files within each
/// directory must be unique plain file names.
fn validate_output_layout(params: &BrainRegisterParams) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let directories = [
        (Stage::FullstackToDownsampled, &params.fullstack_to_downsampled.path),
        (Stage::DownsampledToFullstack, &params.downsampled_to_fullstack.path),
        (Stage::DownsampledToCcf, &params.downsampled_to_ccf.path),
        (Stage::CcfToDownsampled, &params.ccf_to_downsampled.path),
    ];
    let mut seen: HashMap<std::path::PathBuf, Stage> = HashMap::new();
    for (stage, dir) in directories {
        if dir.trim().is_empty() {
            continue;
        }
        let normalized = crate::config::normalize(Path::new(dir));
        if let Some(first) = seen.get(&normalized) {
            errors.push(ValidationError::SharedOutputDirectory {
                first_key: first.key("path"),
                second_key: stage.key("path"),
                path: dir.clone(),
            });
        } else {
            seen.insert(normalized, stage);
        }
    }

    let transform_files: [(Stage, Vec<&String>); 4] = [
        (
            Stage::FullstackToDownsampled,
            vec![&params.fullstack_to_downsampled.transform_params_filename],
        ),
        (
            Stage::DownsampledToFullstack,
            vec![&params.downsampled_to_fullstack.transform_params_filename],
        ),
        (
            Stage::DownsampledToCcf,
            params.downsampled_to_ccf.transform_params_filenames.iter().collect(),
        ),
        (
            Stage::CcfToDownsampled,
            params.ccf_to_downsampled.transform_params_filenames.iter().collect(),
        ),
    ];
    for (stage, filenames) in transform_files {
        let mut seen_names = Vec::new();
        for filename in filenames {
            if filename.trim().is_empty() {
                continue;
            }
            if !is_plain_file_name(filename) {
                errors.push(ValidationError::InvalidTransformParamsFilename {
                    key: stage.key("transform-params-filenames"),
                    filename: filename.clone(),
                });
            } else if seen_names.contains(&filename) {
                errors.push(ValidationError::DuplicateTransformParamsFilename {
                    stage: stage.to_string(),
                    filename: filename.clone(),
                });
            } else {
                seen_names.push(filename);
            }
        }
    }

    errors
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

/// Check that every input the layout points at exists on disk.
///
/// Separate from [`validate_params`] so a parameters file can be checked
/// before the data it refers to has been copied into place.
pub fn check_inputs_exist(layout: &crate::layout::RegistrationLayout) -> Result<(), Vec<ValidationError>> {
    let mut inputs = vec![("Sample template".to_string(), layout.sample.template.clone())];
    inputs.extend(
        layout
            .sample
            .images
            .iter()
            .map(|image| ("Sample image".to_string(), image.source.clone())),
    );
    inputs.push(("CCF template".to_string(), layout.ccf.template.clone()));
    inputs.push(("CCF annotation".to_string(), layout.ccf.annotation.clone()));
    for (stage, files) in [
        (Stage::DownsampledToCcf, &layout.downsampled_to_ccf.parameters_files),
        (Stage::CcfToDownsampled, &layout.ccf_to_downsampled.parameters_files),
    ] {
        inputs.extend(
            files
                .iter()
                .map(|file| (format!("{} elastix parameters file", stage), file.clone())),
        );
    }

    let errors: Vec<ValidationError> = inputs
        .into_iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(description, path)| ValidationError::MissingInput { description, path })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceRef;
    use crate::test_support::sample_params;

    #[test]
    fn valid_params_pass() {
        assert_eq!(validate_params(&sample_params()), Ok(()));
    }

    #[test]
    fn unset_and_negative_resolution_are_reported_per_axis() {
        let mut params = sample_params();
        params.sample.resolution = Resolution::new(0.0, -2.0, f64::NAN);

        let errors = validate_params(&params).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[0].to_string(),
            "Image resolution 'sample-template-resolution.x-um' is not set"
        );
        assert!(errors[1].to_string().contains("must be a positive number, got -2"));
    }

    #[test]
    fn malformed_orientation() {
        let mut params = sample_params();
        params.sample.orientation = "PIRA".to_string();

        let errors = validate_params(&params).unwrap_err();
        assert!(matches!(
            &errors[0],
            ValidationError::MalformedOrientation { key, .. } if key == "sample-template-orientation"
        ));
    }

    #[test]
    fn parameter_file_count_mismatch() {
        let mut params = sample_params();
        params
            .downsampled_to_ccf
            .parameters_files
            .push(ResourceRef::parse("brainregister:bspline"));
        params.ccf_to_downsampled.parameters_files.clear();
        params.ccf_to_downsampled.transform_params_filenames.clear();

        let errors = validate_params(&params).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ParameterFilesMismatch {
                    stage: "downsampled-to-ccf".to_string(),
                    parameters_files: 3,
                    transform_params_filenames: 2,
                },
                ValidationError::MissingParameterFiles {
                    stage: "ccf-to-downsampled".to_string(),
                },
            ]
        );
        assert!(errors[0]
            .to_string()
            .contains("transform-params-filenames (2) and parameters-files (3) are not equal in length"));
    }

    #[test]
    fn invalid_prefilter() {
        let mut params = sample_params();
        params.downsampled_to_ccf.prefilter = "X,1,1,1".to_string();

        let errors = validate_params(&params).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidFilter { key, .. } if key == "downsampled-to-ccf-prefilter"
        ));
    }

    #[test]
    fn empty_values_are_reported() {
        let mut params = sample_params();
        params.sample.template_path.clear();
        params.sample.images.push("  ".to_string());

        let errors = validate_params(&params).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyValue {
            key: "sample-template-path".to_string()
        }));
        assert!(errors.contains(&ValidationError::EmptyValue {
            key: "sample-images[2]".to_string()
        }));
    }

    #[test]
    fn shared_output_directory() {
        let mut params = sample_params();
        params.ccf_to_downsampled.path = "./sample-to-ccf".to_string();

        let errors = validate_params(&params).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::SharedOutputDirectory {
                first_key: "downsampled-to-ccf-path".to_string(),
                second_key: "ccf-to-downsampled-path".to_string(),
                path: "./sample-to-ccf".to_string(),
            }]
        );
    }

    #[test]
    fn transform_filenames_must_be_plain_and_unique() {
        let mut params = sample_params();
        params.downsampled_to_ccf.transform_params_filenames =
            vec!["same.txt".to_string(), "same.txt".to_string()];
        params.downsampled_to_fullstack.transform_params_filename = "../escape.txt".to_string();

        let errors = validate_params(&params).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidTransformParamsFilename { filename, .. } if filename == "../escape.txt"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateTransformParamsFilename { filename, .. } if filename == "same.txt"
        )));
    }
}
