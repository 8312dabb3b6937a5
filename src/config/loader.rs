// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_ORIENTATION;
use crate::config::ResourceRef;
use crate::errors::{ParamsError, ParamsResult};
use crate::observability::messages::params::ParamsLoaded;
use crate::observability::messages::StructuredLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Complete contents of a `brainregister_parameters.yaml` file.
///
/// The file itself is a single flat mapping of `kebab-case` keys. In Rust the
/// keys are grouped by the phase they configure; each group is flattened back
/// into the same mapping, so the on-disk layout is unchanged.
///
/// # Example
/// ```yaml
/// sample-template-path: ../stacks/autofluorescence.nrrd
/// sample-images: [cfos.nrrd]
/// sample-template-resolution: {x-um: 4.0, y-um: 4.0, z-um: 10.0}
/// sample-template-orientation: PIR
/// fullstack-to-downsampled-path: downsampled
/// fullstack-to-downsampled-ccf-path: brainregister:allen-ccf
/// # ...
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainRegisterParams {
    #[serde(flatten)]
    pub sample: SampleTemplateParams,
    #[serde(flatten)]
    pub fullstack_to_downsampled: FullstackToDownsampledParams,
    #[serde(flatten)]
    pub downsampled_to_fullstack: DownsampledToFullstackParams,
    #[serde(flatten)]
    pub downsampled_to_ccf: DownsampledToCcfParams,
    #[serde(flatten)]
    pub ccf_to_downsampled: CcfToDownsampledParams,
}

/// The sample template and the images that follow it through every transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTemplateParams {
    #[serde(rename = "sample-template-path")]
    pub template_path: String,
    /// File names relative to the sample template's directory
    #[serde(rename = "sample-images", default)]
    pub images: Vec<String>,
    #[serde(rename = "sample-template-resolution")]
    pub resolution: Resolution,
    #[serde(rename = "sample-template-orientation", default = "default_orientation")]
    pub orientation: String,
}

/// Voxel size in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Resolution {
    pub x_um: f64,
    pub y_um: f64,
    pub z_um: f64,
}

impl Resolution {
    pub fn new(x_um: f64, y_um: f64, z_um: f64) -> Self {
        Self { x_um, y_um, z_um }
    }

    /// `(key, value)` pairs in x, y, z order
    pub fn axes(&self) -> [(&'static str, f64); 3] {
        [("x-um", self.x_um), ("y-um", self.y_um), ("z-um", self.z_um)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullstackToDownsampledParams {
    #[serde(rename = "fullstack-to-downsampled-path")]
    pub path: String,
    /// CCF parameters file, or a directory holding `ccf_parameters.yaml`
    #[serde(rename = "fullstack-to-downsampled-ccf-path")]
    pub ccf_path: ResourceRef,
    #[serde(rename = "fullstack-to-downsampled-adaptive-filter", default)]
    pub adaptive_filter: bool,
    #[serde(rename = "fullstack-to-downsampled-prefix", default)]
    pub prefix: String,
    #[serde(rename = "fullstack-to-downsampled-save-template", default)]
    pub save_template: bool,
    #[serde(rename = "fullstack-to-downsampled-save-images", default)]
    pub save_images: bool,
    #[serde(rename = "fullstack-to-downsampled-save-image-type", default)]
    pub save_image_type: ImageFormat,
    #[serde(rename = "fullstack-to-downsampled-transform-params-filename")]
    pub transform_params_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownsampledToFullstackParams {
    #[serde(rename = "downsampled-to-fullstack-path")]
    pub path: String,
    #[serde(rename = "downsampled-to-fullstack-prefix", default)]
    pub prefix: String,
    #[serde(rename = "downsampled-to-fullstack-save-template", default)]
    pub save_template: bool,
    #[serde(rename = "downsampled-to-fullstack-save-annotation", default)]
    pub save_annotation: bool,
    #[serde(rename = "downsampled-to-fullstack-save-image-type", default)]
    pub save_image_type: ImageFormat,
    #[serde(rename = "downsampled-to-fullstack-transform-params-filename")]
    pub transform_params_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownsampledToCcfParams {
    #[serde(rename = "downsampled-to-ccf-path")]
    pub path: String,
    /// `none`, `adaptive` or a filter pipeline
    #[serde(rename = "downsampled-to-ccf-prefilter", default = "default_prefilter")]
    pub prefilter: String,
    #[serde(rename = "downsampled-to-ccf-parameters-files")]
    pub parameters_files: Vec<ResourceRef>,
    #[serde(rename = "downsampled-to-ccf-transform-params-filenames")]
    pub transform_params_filenames: Vec<String>,
    #[serde(rename = "downsampled-to-ccf-prefix", default)]
    pub prefix: String,
    #[serde(rename = "downsampled-to-ccf-save-template", default)]
    pub save_template: bool,
    #[serde(rename = "downsampled-to-ccf-save-images", default)]
    pub save_images: bool,
    #[serde(rename = "downsampled-to-ccf-save-image-type", default)]
    pub save_image_type: ImageFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcfToDownsampledParams {
    #[serde(rename = "ccf-to-downsampled-path")]
    pub path: String,
    #[serde(rename = "ccf-to-downsampled-prefilter", default = "default_prefilter")]
    pub prefilter: String,
    #[serde(rename = "ccf-to-downsampled-parameters-files")]
    pub parameters_files: Vec<ResourceRef>,
    #[serde(rename = "ccf-to-downsampled-transform-params-filenames")]
    pub transform_params_filenames: Vec<String>,
    #[serde(rename = "ccf-to-downsampled-prefix", default)]
    pub prefix: String,
    #[serde(rename = "ccf-to-downsampled-save-template", default)]
    pub save_template: bool,
    #[serde(rename = "ccf-to-downsampled-save-annotation", default)]
    pub save_annotation: bool,
    #[serde(rename = "ccf-to-downsampled-save-image-type", default)]
    pub save_image_type: ImageFormat,
}

/// Image container written for saved artifacts.
///
/// The same identifier is handed to elastix as `ResultImageFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Nrrd,
    Tiff,
    Mhd,
}

impl ImageFormat {
    /// File extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Nrrd => "nrrd",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Mhd => "mhd",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn default_orientation() -> String {
    DEFAULT_ORIENTATION.to_string()
}

fn default_prefilter() -> String {
    crate::config::consts::FILTER_NONE.to_string()
}

impl BrainRegisterParams {
    /// Parse parameters from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize back to YAML, keys in schema order.
    pub fn to_yaml_string(&self) -> ParamsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Load parameters from a YAML file
pub fn load_params<P: AsRef<Path>>(path: P) -> ParamsResult<BrainRegisterParams> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ParamsError::io(path, e))?;
    let params = BrainRegisterParams::from_yaml_str(&content).map_err(|source| ParamsError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    ParamsLoaded {
        path,
        sample_images: params.sample.images.len(),
    }
    .log();

    Ok(params)
}

/// Load and validate parameters from a YAML file
///
/// All validation failures are gathered into a single [`ParamsError::Validation`].
pub fn load_and_validate_params<P: AsRef<Path>>(path: P) -> ParamsResult<BrainRegisterParams> {
    let params = load_params(path)?;
    crate::config::validate_params(&params).map_err(ParamsError::Validation)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_PARAMS: &str = r#"
sample-template-path: stacks/template.nrrd
sample-images: [cfos.nrrd, dapi.nrrd]
sample-template-resolution: {x-um: 4.0, y-um: 4.0, z-um: 10.0}
fullstack-to-downsampled-path: downsampled
fullstack-to-downsampled-ccf-path: brainregister:allen-ccf
fullstack-to-downsampled-prefix: ds_
fullstack-to-downsampled-transform-params-filename: fs-ds.txt
downsampled-to-fullstack-path: fullstack
downsampled-to-fullstack-transform-params-filename: ds-fs.txt
downsampled-to-ccf-path: sample-to-ccf
downsampled-to-ccf-parameters-files: [brainregister:affine, brainregister_bspline]
downsampled-to-ccf-transform-params-filenames: [ds-ccf-0.txt, ds-ccf-1.txt]
ccf-to-downsampled-path: ccf-to-sample
ccf-to-downsampled-prefilter: M,2,2,2
ccf-to-downsampled-parameters-files: [custom/affine.txt]
ccf-to-downsampled-transform-params-filenames: [ccf-ds-0.txt]
ccf-to-downsampled-save-image-type: tiff
"#;

    #[test]
    fn parse_minimal_params() {
        let params = BrainRegisterParams::from_yaml_str(MINIMAL_PARAMS).unwrap();

        assert_eq!(params.sample.template_path, "stacks/template.nrrd");
        assert_eq!(params.sample.images, vec!["cfos.nrrd", "dapi.nrrd"]);
        assert_eq!(params.sample.resolution, Resolution::new(4.0, 4.0, 10.0));
        assert_eq!(params.sample.orientation, "PIR");
        assert_eq!(
            params.fullstack_to_downsampled.ccf_path,
            ResourceRef::Builtin("allen-ccf".to_string())
        );
        assert!(!params.fullstack_to_downsampled.adaptive_filter);
        assert_eq!(params.downsampled_to_ccf.prefilter, "none");
        assert_eq!(
            params.downsampled_to_ccf.parameters_files,
            vec![
                ResourceRef::Builtin("affine".to_string()),
                ResourceRef::Builtin("bspline".to_string()),
            ]
        );
        assert_eq!(params.ccf_to_downsampled.prefilter, "M,2,2,2");
        assert_eq!(params.ccf_to_downsampled.save_image_type, ImageFormat::Tiff);
        assert_eq!(
            params.downsampled_to_fullstack.save_image_type,
            ImageFormat::Nrrd
        );
    }

    #[test]
    fn rejects_unknown_image_type() {
        let yaml = MINIMAL_PARAMS.replace(
            "ccf-to-downsampled-save-image-type: tiff",
            "ccf-to-downsampled-save-image-type: png",
        );
        let err = BrainRegisterParams::from_yaml_str(&yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("png"), "{}", msg);
        assert!(msg.contains("nrrd"), "{}", msg);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let yaml = MINIMAL_PARAMS.replace("downsampled-to-fullstack-path: fullstack\n", "");
        let err = BrainRegisterParams::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("downsampled-to-fullstack-path"));
    }

    #[test]
    fn serializes_with_flat_kebab_keys() {
        let params = BrainRegisterParams::from_yaml_str(MINIMAL_PARAMS).unwrap();
        let yaml = params.to_yaml_string().unwrap();

        assert!(yaml.contains("sample-template-path: stacks/template.nrrd"));
        assert!(yaml.contains("fullstack-to-downsampled-ccf-path: brainregister:allen-ccf"));
        assert!(yaml.contains("- brainregister:bspline"));
        assert!(yaml.contains("ccf-to-downsampled-save-image-type: tiff"));

        let reparsed = BrainRegisterParams::from_yaml_str(&yaml).unwrap();
        assert_eq!(reparsed, params);
    }

    #[test]
    fn load_params_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "sample-template-path: [").unwrap();

        let err = load_params(&path).unwrap_err();
        assert!(matches!(err, ParamsError::Yaml { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn load_and_validate_rejects_unset_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        let yaml = MINIMAL_PARAMS.replace(
            "{x-um: 4.0, y-um: 4.0, z-um: 10.0}",
            "{x-um: 0.0, y-um: 4.0, z-um: 10.0}",
        );
        std::fs::write(&path, yaml).unwrap();

        let err = load_and_validate_params(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Parameter validation failed"));
        assert!(msg.contains("sample-template-resolution.x-um"));
    }
}
