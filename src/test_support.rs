// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit and integration tests.

use crate::config::consts::{PARAMETERS_FILENAME, SCALING_PARAMETERS_RESOURCE};
use crate::config::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Valid parameters for a sample at `<root>/stacks/autofl.nrrd`, loaded from
/// `<root>/brainregister/brainregister_parameters.yaml`.
pub fn sample_params() -> BrainRegisterParams {
    let builtin = |name: &str| ResourceRef::Builtin(name.to_string());
    BrainRegisterParams {
        sample: SampleTemplateParams {
            template_path: "../stacks/autofl.nrrd".to_string(),
            images: vec!["cfos.nrrd".to_string(), "dapi.nrrd".to_string()],
            resolution: Resolution::new(4.0, 4.0, 10.0),
            orientation: "PIR".to_string(),
        },
        fullstack_to_downsampled: FullstackToDownsampledParams {
            path: "downsampled".to_string(),
            ccf_path: builtin("allen-ccf"),
            adaptive_filter: false,
            prefix: "ds_".to_string(),
            save_template: true,
            save_images: true,
            save_image_type: ImageFormat::Nrrd,
            transform_params_filename: "fs-ds.txt".to_string(),
        },
        downsampled_to_fullstack: DownsampledToFullstackParams {
            path: "fullstack".to_string(),
            prefix: "fs_".to_string(),
            save_template: true,
            save_annotation: true,
            save_image_type: ImageFormat::Nrrd,
            transform_params_filename: "ds-fs.txt".to_string(),
        },
        downsampled_to_ccf: DownsampledToCcfParams {
            path: "sample-to-ccf".to_string(),
            prefilter: "none".to_string(),
            parameters_files: vec![builtin("affine"), builtin("bspline")],
            transform_params_filenames: vec!["ds-ccf-0.txt".to_string(), "ds-ccf-1.txt".to_string()],
            prefix: "sample_".to_string(),
            save_template: true,
            save_images: true,
            save_image_type: ImageFormat::Nrrd,
        },
        ccf_to_downsampled: CcfToDownsampledParams {
            path: "ccf-to-sample".to_string(),
            prefilter: "none".to_string(),
            parameters_files: vec![builtin("affine"), builtin("bspline")],
            transform_params_filenames: vec!["ccf-ds-0.txt".to_string(), "ccf-ds-1.txt".to_string()],
            prefix: "ccf_".to_string(),
            save_template: true,
            save_annotation: true,
            save_image_type: ImageFormat::Nrrd,
        },
    }
}

/// Build a resource root under `<root>/resources` holding the shipped elastix
/// files and a 25um CCF with placeholder `template.nrrd` and `annotation.nrrd`.
pub fn write_ccf(root: &Path) -> ResourceRoot {
    let bundled = ResourceRoot::bundled();
    let resources = ResourceRoot::new(root.join("resources"));

    for rel in [
        SCALING_PARAMETERS_RESOURCE,
        "elastix-parameter-files/01_affine.txt",
        "elastix-parameter-files/02_bspline.txt",
    ] {
        let target = resources.path().join(rel);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::copy(bundled.path().join(rel), target).unwrap();
    }

    let ccf_dir = resources.path().join("allen-ccf");
    fs::create_dir_all(&ccf_dir).unwrap();
    fs::write(
        ccf_dir.join("ccf_parameters.yaml"),
        "ccf-template-path: template.nrrd\n\
         ccf-annotation-path: annotation.nrrd\n\
         ccf-template-resolution: {x-um: 25.0, y-um: 25.0, z-um: 25.0}\n\
         ccf-template-orientation: PIR\n",
    )
    .unwrap();
    fs::write(ccf_dir.join("template.nrrd"), "ccf template").unwrap();
    fs::write(ccf_dir.join("annotation.nrrd"), "ccf annotation").unwrap();

    resources
}

/// Write the sample stack and [`sample_params`] under `root`; returns the
/// parameters file path.
pub fn write_sample(root: &Path, params: &BrainRegisterParams) -> PathBuf {
    let stacks = root.join("stacks");
    fs::create_dir_all(&stacks).unwrap();
    for name in ["autofl.nrrd", "cfos.nrrd", "dapi.nrrd"] {
        fs::write(stacks.join(name), name).unwrap();
    }

    let params_dir = root.join("brainregister");
    fs::create_dir_all(&params_dir).unwrap();
    let params_path = params_dir.join(PARAMETERS_FILENAME);
    fs::write(&params_path, params.to_yaml_string().unwrap()).unwrap();
    params_path
}
