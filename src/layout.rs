// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete file locations for a registration run.
//!
//! Parameter files hold relative paths, built-in resource names and per-phase
//! prefixes. [`RegistrationLayout::resolve`] turns all of them into the paths
//! the pipeline reads and writes, so nothing downstream joins paths itself.
//!
//! Output images are named `{prefix}{stem}.{ext}`. Images that have been
//! through several phases carry every prefix, most recent first: the sample
//! template `autofl.nrrd` ends up as `sample_ds_autofl.nrrd` in CCF space.

use crate::config::consts::SCALING_PARAMETERS_RESOURCE;
use crate::config::{
    load_ccf_params, normalize, resolve_ccf_params_path, validate_ccf_params, BrainRegisterParams,
    ImageFormat, ResourceRef, ResourceRoot, Stage,
};
use crate::errors::{ParamsError, ParamsResult, PipelineError, PipelineResult};
use crate::observability::messages::params::OutputDirCreated;
use crate::observability::messages::StructuredLog;
use crate::scale::ScaleFactors;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Every input and output path of a registration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationLayout {
    /// Directory of the parameters file; relative paths are resolved against it
    pub params_dir: PathBuf,
    pub sample: SampleLayout,
    pub ccf: CcfLayout,
    pub scale: ScaleFactors,
    /// Base transformix map for the fullstack/downsampled scaling
    pub scaling_parameters: PathBuf,
    pub fullstack_to_downsampled: FullstackToDownsampledLayout,
    pub downsampled_to_ccf: DownsampledToCcfLayout,
    pub ccf_to_downsampled: CcfToDownsampledLayout,
    pub downsampled_to_fullstack: DownsampledToFullstackLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleLayout {
    pub template: PathBuf,
    pub images: Vec<SampleImage>,
}

/// A sample image and where each phase writes its copy of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleImage {
    pub source: PathBuf,
    pub downsampled: PathBuf,
    pub in_ccf: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcfLayout {
    pub params_file: PathBuf,
    pub template: PathBuf,
    pub annotation: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullstackToDownsampledLayout {
    pub dir: PathBuf,
    pub transform_parameters: PathBuf,
    /// Downsampled sample template
    pub template: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownsampledToCcfLayout {
    pub dir: PathBuf,
    pub parameters_files: Vec<PathBuf>,
    pub transform_parameters: Vec<PathBuf>,
    /// Downsampled sample template in CCF space
    pub template: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcfToDownsampledLayout {
    pub dir: PathBuf,
    pub parameters_files: Vec<PathBuf>,
    pub transform_parameters: Vec<PathBuf>,
    /// CCF template in downsampled space
    pub template: PathBuf,
    /// CCF annotation in downsampled space
    pub annotation: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownsampledToFullstackLayout {
    pub dir: PathBuf,
    pub transform_parameters: PathBuf,
    /// CCF template in fullstack space
    pub template: PathBuf,
    /// CCF annotation in fullstack space
    pub annotation: PathBuf,
}

impl RegistrationLayout {
    /// Resolve every path named by `params`, loaded from `params_path`.
    ///
    /// Reads and validates the CCF parameters file the parameters point at;
    /// no other file is touched.
    pub fn resolve(
        params_path: &Path,
        params: &BrainRegisterParams,
        resources: &ResourceRoot,
    ) -> ParamsResult<Self> {
        let params_dir = match params_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => normalize(dir),
            _ => PathBuf::from("."),
        };

        let ccf_params_file = resolve_ccf_params_path(
            &params.fullstack_to_downsampled.ccf_path,
            &params_dir,
            resources,
        )?;
        let ccf_params = load_ccf_params(&ccf_params_file)?;
        validate_ccf_params(&ccf_params).map_err(ParamsError::Validation)?;
        let ccf_dir = parent_dir(&ccf_params_file);
        let ccf = CcfLayout {
            template: normalize(&ccf_dir.join(&ccf_params.ccf_template_path)),
            annotation: normalize(&ccf_dir.join(&ccf_params.ccf_annotation_path)),
            params_file: ccf_params_file,
        };

        let fs_ds = &params.fullstack_to_downsampled;
        let ds_ccf = &params.downsampled_to_ccf;
        let ccf_ds = &params.ccf_to_downsampled;
        let ds_fs = &params.downsampled_to_fullstack;

        let fs_ds_dir = normalize(&params_dir.join(&fs_ds.path));
        let ds_ccf_dir = normalize(&params_dir.join(&ds_ccf.path));
        let ccf_ds_dir = normalize(&params_dir.join(&ccf_ds.path));
        let ds_fs_dir = normalize(&params_dir.join(&ds_fs.path));

        let template = normalize(&params_dir.join(&params.sample.template_path));
        let sample_dir = parent_dir(&template);

        // prefixes chain in the order the phases are applied
        let ds_prefix = fs_ds.prefix.clone();
        let ds_ccf_prefix = format!("{}{}", ds_ccf.prefix, fs_ds.prefix);
        let ccf_ds_prefix = ccf_ds.prefix.clone();
        let ds_fs_prefix = format!("{}{}", ds_fs.prefix, ccf_ds.prefix);

        let images = params
            .sample
            .images
            .iter()
            .map(|name| {
                let source = normalize(&sample_dir.join(name));
                SampleImage {
                    downsampled: artifact(&fs_ds_dir, &ds_prefix, &source, fs_ds.save_image_type),
                    in_ccf: artifact(&ds_ccf_dir, &ds_ccf_prefix, &source, ds_ccf.save_image_type),
                    source,
                }
            })
            .collect();

        let resolve_all = |files: &[ResourceRef]| -> ParamsResult<Vec<PathBuf>> {
            files
                .iter()
                .map(|file| file.resolve(&params_dir, resources).map_err(ParamsError::from))
                .collect()
        };

        Ok(RegistrationLayout {
            scale: ScaleFactors::new(&params.sample.resolution, &ccf_params.ccf_template_resolution),
            scaling_parameters: resources.join(SCALING_PARAMETERS_RESOURCE)?,
            fullstack_to_downsampled: FullstackToDownsampledLayout {
                transform_parameters: fs_ds_dir.join(&fs_ds.transform_params_filename),
                template: artifact(&fs_ds_dir, &ds_prefix, &template, fs_ds.save_image_type),
                dir: fs_ds_dir,
            },
            downsampled_to_ccf: DownsampledToCcfLayout {
                parameters_files: resolve_all(&ds_ccf.parameters_files)?,
                transform_parameters: ds_ccf
                    .transform_params_filenames
                    .iter()
                    .map(|name| ds_ccf_dir.join(name))
                    .collect(),
                template: artifact(&ds_ccf_dir, &ds_ccf_prefix, &template, ds_ccf.save_image_type),
                dir: ds_ccf_dir,
            },
            ccf_to_downsampled: CcfToDownsampledLayout {
                parameters_files: resolve_all(&ccf_ds.parameters_files)?,
                transform_parameters: ccf_ds
                    .transform_params_filenames
                    .iter()
                    .map(|name| ccf_ds_dir.join(name))
                    .collect(),
                template: artifact(&ccf_ds_dir, &ccf_ds_prefix, &ccf.template, ccf_ds.save_image_type),
                annotation: artifact(&ccf_ds_dir, &ccf_ds_prefix, &ccf.annotation, ccf_ds.save_image_type),
                dir: ccf_ds_dir,
            },
            downsampled_to_fullstack: DownsampledToFullstackLayout {
                transform_parameters: ds_fs_dir.join(&ds_fs.transform_params_filename),
                template: artifact(&ds_fs_dir, &ds_fs_prefix, &ccf.template, ds_fs.save_image_type),
                annotation: artifact(&ds_fs_dir, &ds_fs_prefix, &ccf.annotation, ds_fs.save_image_type),
                dir: ds_fs_dir,
            },
            sample: SampleLayout { template, images },
            ccf,
            params_dir,
        })
    }

    /// Output directory of each phase.
    pub fn output_dirs(&self) -> [(Stage, &Path); 4] {
        [
            (Stage::FullstackToDownsampled, &self.fullstack_to_downsampled.dir),
            (Stage::DownsampledToFullstack, &self.downsampled_to_fullstack.dir),
            (Stage::DownsampledToCcf, &self.downsampled_to_ccf.dir),
            (Stage::CcfToDownsampled, &self.ccf_to_downsampled.dir),
        ]
    }

    /// Create the four phase output directories.
    pub async fn create_output_dirs(&self) -> PipelineResult<()> {
        for (_, dir) in self.output_dirs() {
            if tokio::fs::try_exists(dir).await.unwrap_or(false) {
                continue;
            }
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| PipelineError::io(dir, e))?;
            OutputDirCreated { path: dir }.log();
        }
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `{dir}/{prefix}{stem}.{ext}` for an image derived from `source`.
fn artifact(dir: &Path, prefix: &str, source: &Path, format: ImageFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    dir.join(format!("{}{}.{}", prefix, stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_params, write_ccf};

    #[test]
    fn resolves_paths_against_params_and_template_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let resources = write_ccf(dir.path());
        let params_path = dir.path().join("brainregister/brainregister_parameters.yaml");

        let layout = RegistrationLayout::resolve(&params_path, &sample_params(), &resources).unwrap();
        let root = dir.path();

        assert_eq!(layout.params_dir, root.join("brainregister"));
        assert_eq!(layout.sample.template, root.join("stacks/autofl.nrrd"));
        assert_eq!(layout.sample.images[0].source, root.join("stacks/cfos.nrrd"));
        assert_eq!(layout.ccf.template, resources.path().join("allen-ccf/template.nrrd"));
        assert_eq!(
            layout.downsampled_to_ccf.parameters_files[0],
            resources.path().join("elastix-parameter-files/01_affine.txt")
        );
        assert_eq!(
            layout.fullstack_to_downsampled.transform_parameters,
            root.join("brainregister/downsampled/fs-ds.txt")
        );
        assert_eq!(layout.scale.ccf_to_sample, [6.25, 6.25, 2.5]);
    }

    #[test]
    fn artifact_names_chain_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let resources = write_ccf(dir.path());
        let params_path = dir.path().join("brainregister/brainregister_parameters.yaml");
        let mut params = sample_params();
        params.downsampled_to_fullstack.save_image_type = ImageFormat::Tiff;

        let layout = RegistrationLayout::resolve(&params_path, &params, &resources).unwrap();
        let out = dir.path().join("brainregister");

        assert_eq!(layout.fullstack_to_downsampled.template, out.join("downsampled/ds_autofl.nrrd"));
        assert_eq!(layout.sample.images[1].downsampled, out.join("downsampled/ds_dapi.nrrd"));
        assert_eq!(layout.downsampled_to_ccf.template, out.join("sample-to-ccf/sample_ds_autofl.nrrd"));
        assert_eq!(layout.sample.images[0].in_ccf, out.join("sample-to-ccf/sample_ds_cfos.nrrd"));
        assert_eq!(layout.ccf_to_downsampled.template, out.join("ccf-to-sample/ccf_template.nrrd"));
        assert_eq!(layout.ccf_to_downsampled.annotation, out.join("ccf-to-sample/ccf_annotation.nrrd"));
        assert_eq!(layout.downsampled_to_fullstack.template, out.join("fullstack/fs_ccf_template.tiff"));
        assert_eq!(
            layout.downsampled_to_fullstack.annotation,
            out.join("fullstack/fs_ccf_annotation.tiff")
        );
    }

    #[test]
    fn missing_ccf_parameters_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let resources = ResourceRoot::new(dir.path().join("nowhere"));
        let err = RegistrationLayout::resolve(
            &dir.path().join("params.yaml"),
            &sample_params(),
            &resources,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ccf_parameters.yaml"));
    }

    #[tokio::test]
    async fn create_output_dirs_creates_every_phase_dir() {
        let dir = tempfile::tempdir().unwrap();
        let resources = write_ccf(dir.path());
        let params_path = dir.path().join("brainregister/brainregister_parameters.yaml");
        let layout = RegistrationLayout::resolve(&params_path, &sample_params(), &resources).unwrap();

        layout.create_output_dirs().await.unwrap();
        layout.create_output_dirs().await.unwrap();

        for (_, dir) in layout.output_dirs() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
    }
}
