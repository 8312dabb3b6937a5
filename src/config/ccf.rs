// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{CCF_PARAMETERS_FILENAME, DEFAULT_ORIENTATION};
use crate::config::{Orientation, Resolution, ResourceRef, ResourceRoot};
use crate::errors::{ParamsError, ParamsResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a `ccf_parameters.yaml` file describing the reference atlas.
///
/// Image paths are relative to the directory of the CCF parameters file.
///
/// # Example
/// ```yaml
/// ccf-template-path: average_template_25.nrrd
/// ccf-annotation-path: annotation_25.nrrd
/// ccf-template-resolution: {x-um: 25.0, y-um: 25.0, z-um: 25.0}
/// ccf-template-orientation: PIR
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CcfParams {
    pub ccf_template_path: String,
    pub ccf_annotation_path: String,
    pub ccf_template_resolution: Resolution,
    #[serde(default = "default_orientation")]
    pub ccf_template_orientation: String,
}

fn default_orientation() -> String {
    DEFAULT_ORIENTATION.to_string()
}

/// Load CCF parameters from a YAML file
pub fn load_ccf_params<P: AsRef<Path>>(path: P) -> ParamsResult<CcfParams> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ParamsError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|source| ParamsError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the `fullstack-to-downsampled-ccf-path` reference to a CCF parameters file.
///
/// The reference may name the YAML file itself or a directory containing
/// `ccf_parameters.yaml`.
pub fn resolve_ccf_params_path(
    reference: &ResourceRef,
    params_dir: &Path,
    resources: &ResourceRoot,
) -> ParamsResult<PathBuf> {
    let path = reference.resolve(params_dir, resources)?;
    if path.is_dir() {
        Ok(path.join(CCF_PARAMETERS_FILENAME))
    } else {
        Ok(path)
    }
}

/// Validate CCF parameters, collecting every problem found.
pub fn validate_ccf_params(ccf: &CcfParams) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (key, value) in [
        ("ccf-template-path", &ccf.ccf_template_path),
        ("ccf-annotation-path", &ccf.ccf_annotation_path),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyValue {
                key: key.to_string(),
            });
        }
    }

    errors.extend(crate::config::validation::check_resolution(
        "ccf-template-resolution",
        &ccf.ccf_template_resolution,
    ));

    if let Err(reason) = ccf.ccf_template_orientation.parse::<Orientation>() {
        errors.push(ValidationError::MalformedOrientation {
            key: "ccf-template-orientation".to_string(),
            code: ccf.ccf_template_orientation.clone(),
            reason,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
