// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{BrainRegisterParams, Stage};
use crate::layout::RegistrationLayout;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    TransformParameters,
    Template,
    Image,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    /// On disk; a run loads it instead of recomputing
    Present,
    /// Requested and not on disk yet
    Pending,
    /// `save-*` is false for it
    NotRequested,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePlan {
    pub stage: Stage,
    pub output_dir: PathBuf,
    pub artifacts: Vec<PlannedArtifact>,
}

/// Survey of every artifact a registration run reads or writes.
///
/// ```rust,no_run
/// # use brainregister::pipeline::RegistrationPlan;
/// # fn show(plan: &RegistrationPlan) -> serde_json::Result<()> {
/// println!("{} artifacts pending", plan.pending().count());
/// println!("{}", plan.to_json()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationPlan {
    pub stages: Vec<StagePlan>,
}

impl RegistrationPlan {
    pub fn survey(params: &BrainRegisterParams, layout: &RegistrationLayout) -> Self {
        let fs_ds = &layout.fullstack_to_downsampled;
        let ds_ccf = &layout.downsampled_to_ccf;
        let ccf_ds = &layout.ccf_to_downsampled;
        let ds_fs = &layout.downsampled_to_fullstack;

        let mut fullstack_to_downsampled = vec![
            artifact(ArtifactKind::TransformParameters, &fs_ds.transform_parameters, true),
            artifact(ArtifactKind::Template, &fs_ds.template, params.fullstack_to_downsampled.save_template),
        ];
        fullstack_to_downsampled.extend(layout.sample.images.iter().map(|image| {
            artifact(
                ArtifactKind::Image,
                &image.downsampled,
                params.fullstack_to_downsampled.save_images,
            )
        }));

        let mut downsampled_to_ccf: Vec<PlannedArtifact> = ds_ccf
            .transform_parameters
            .iter()
            .map(|path| artifact(ArtifactKind::TransformParameters, path, true))
            .collect();
        downsampled_to_ccf.push(artifact(
            ArtifactKind::Template,
            &ds_ccf.template,
            params.downsampled_to_ccf.save_template,
        ));
        downsampled_to_ccf.extend(layout.sample.images.iter().map(|image| {
            artifact(ArtifactKind::Image, &image.in_ccf, params.downsampled_to_ccf.save_images)
        }));

        let mut ccf_to_downsampled: Vec<PlannedArtifact> = ccf_ds
            .transform_parameters
            .iter()
            .map(|path| artifact(ArtifactKind::TransformParameters, path, true))
            .collect();
        ccf_to_downsampled.push(artifact(
            ArtifactKind::Template,
            &ccf_ds.template,
            params.ccf_to_downsampled.save_template,
        ));
        ccf_to_downsampled.push(artifact(
            ArtifactKind::Annotation,
            &ccf_ds.annotation,
            params.ccf_to_downsampled.save_annotation,
        ));

        let downsampled_to_fullstack = vec![
            artifact(ArtifactKind::TransformParameters, &ds_fs.transform_parameters, true),
            artifact(ArtifactKind::Template, &ds_fs.template, params.downsampled_to_fullstack.save_template),
            artifact(
                ArtifactKind::Annotation,
                &ds_fs.annotation,
                params.downsampled_to_fullstack.save_annotation,
            ),
        ];

        let stages = [
            (Stage::FullstackToDownsampled, &fs_ds.dir, fullstack_to_downsampled),
            (Stage::DownsampledToCcf, &ds_ccf.dir, downsampled_to_ccf),
            (Stage::CcfToDownsampled, &ccf_ds.dir, ccf_to_downsampled),
            (Stage::DownsampledToFullstack, &ds_fs.dir, downsampled_to_fullstack),
        ]
        .into_iter()
        .map(|(stage, dir, artifacts)| StagePlan {
            stage,
            output_dir: dir.clone(),
            artifacts,
        })
        .collect();

        RegistrationPlan { stages }
    }

    /// Artifacts a run would still compute.
    pub fn pending(&self) -> impl Iterator<Item = &PlannedArtifact> {
        self.stages
            .iter()
            .flat_map(|stage| stage.artifacts.iter())
            .filter(|artifact| artifact.status == ArtifactStatus::Pending)
    }

    pub fn is_complete(&self) -> bool {
        self.pending().next().is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn artifact(kind: ArtifactKind, path: &Path, requested: bool) -> PlannedArtifact {
    let status = if !requested {
        ArtifactStatus::NotRequested
    } else if path.is_file() {
        ArtifactStatus::Present
    } else {
        ArtifactStatus::Pending
    };
    PlannedArtifact {
        kind,
        path: path.to_path_buf(),
        status,
    }
}
