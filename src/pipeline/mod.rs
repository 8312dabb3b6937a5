// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Registration orchestration.
//!
//! A run moves data between three image spaces: the fullstack sample, the
//! downsampled sample (sample scaled to the CCF resolution) and the CCF. Six
//! steps run in order:
//!
//! 1. **fullstack to downsampled**: write (or load) both scaling maps, build
//!    the downsampled sample template and optionally the downsampled images
//! 2. **register downsampled to CCF**: downsampled template moving, CCF fixed
//! 3. **transform downsampled to CCF**: sample template and images
//! 4. **register CCF to downsampled**: CCF moving, downsampled template fixed
//! 5. **transform CCF to downsampled**: CCF template and annotation
//! 6. **transform downsampled to fullstack**: CCF template and annotation
//!
//! Every artifact already on disk is loaded rather than recomputed and is
//! never overwritten, so an interrupted run picks up where it stopped. The
//! transform parameter files of one registration are a single artifact: the
//! registration is skipped only when all of them exist, otherwise it reruns
//! and rewrites the whole set so the passes stay consistent.
//! Annotations are resampled with nearest-neighbour interpolation.

mod plan;


pub use plan::{ArtifactKind, ArtifactStatus, PlannedArtifact, RegistrationPlan, StagePlan};

use crate::config::{
    check_inputs_exist, load_and_validate_params, BrainRegisterParams, ImageFormat, ResourceRoot,
    Stage,
};
use crate::elastix::{downsampled_to_fullstack_map, fullstack_to_downsampled_map, ParameterMap};
use crate::errors::{ParamsError, PipelineError, PipelineResult};
use crate::filter::{FilterPipeline, FilterSelector};
use crate::layout::RegistrationLayout;
use crate::observability::messages::pipeline::{
    ArtifactExists, ArtifactNotRequested, ArtifactSaved, RegistrationCompleted,
    RegistrationSkipped, RegistrationStarted, StageStarted,
};
use crate::observability::messages::StructuredLog;
use crate::scale::ScaleFactors;
use crate::traits::Registrar;
use std::path::{Path, PathBuf};
use std::slice;
use std::time::Instant;
use tracing::Instrument;

type ScalingMapBuilder = fn(&ParameterMap, &ScaleFactors, [u64; 3], ImageFormat) -> ParameterMap;

/// Drives a [`Registrar`] through a full brainregister run.
pub struct RegistrationPipeline<R: Registrar> {
    registrar: R,
    params: BrainRegisterParams,
    layout: RegistrationLayout,
}

/// Output of the fullstack-to-downsampled step.
struct Downsampled<I> {
    to_downsampled: ParameterMap,
    to_fullstack: ParameterMap,
    template: I,
}

/// CCF images, loaded on first use.
struct CcfImages<I> {
    template: Option<I>,
    annotation: Option<I>,
}

/// CCF images moved into downsampled space by step 5, when it computed them.
struct CcfInSample<I> {
    template: Option<I>,
    annotation: Option<I>,
}

impl<R: Registrar> RegistrationPipeline<R> {
    /// Load, validate and resolve a parameters file and create the output
    /// directories.
    pub async fn open(
        params_path: impl AsRef<Path>,
        resources: &ResourceRoot,
        registrar: R,
    ) -> PipelineResult<Self> {
        let params_path = params_path.as_ref();
        let params = load_and_validate_params(params_path)?;
        let layout = RegistrationLayout::resolve(params_path, &params, resources)?;
        check_inputs_exist(&layout).map_err(ParamsError::Validation)?;
        layout.create_output_dirs().await?;

        Ok(Self {
            registrar,
            params,
            layout,
        })
    }

    pub fn params(&self) -> &BrainRegisterParams {
        &self.params
    }

    pub fn layout(&self) -> &RegistrationLayout {
        &self.layout
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    /// Which artifacts exist and which a call to [`register`](Self::register) would produce.
    pub fn plan(&self) -> RegistrationPlan {
        RegistrationPlan::survey(&self.params, &self.layout)
    }

    /// Run every step, skipping work whose output already exists.
    pub async fn register(&self) -> PipelineResult<()> {
        let downsampled = self.fullstack_to_downsampled().await?;
        let mut ccf = CcfImages {
            template: None,
            annotation: None,
        };

        let ds_to_ccf = self
            .register_downsampled_to_ccf(&downsampled.template, &mut ccf)
            .await?;
        self.transform_downsampled_to_ccf(&downsampled, &ds_to_ccf).await?;

        let ccf_to_ds = self
            .register_ccf_to_downsampled(&downsampled.template, &mut ccf)
            .await?;
        let in_sample = self.transform_ccf_to_downsampled(&mut ccf, &ccf_to_ds).await?;

        self.transform_downsampled_to_fullstack(&mut ccf, &ccf_to_ds, &downsampled.to_fullstack, in_sample)
            .await
    }

    async fn fullstack_to_downsampled(&self) -> PipelineResult<Downsampled<R::Image>> {
        let stage = Stage::FullstackToDownsampled;
        StageStarted { stage }.log();

        let layout = &self.layout.fullstack_to_downsampled;
        let settings = &self.params.fullstack_to_downsampled;
        let mut fullstack = None;

        let to_downsampled = self
            .scaling_map(
                stage,
                &layout.transform_parameters,
                fullstack_to_downsampled_map,
                settings.save_image_type,
                &mut fullstack,
            )
            .await?;
        let to_fullstack = self
            .scaling_map(
                Stage::DownsampledToFullstack,
                &self.layout.downsampled_to_fullstack.transform_parameters,
                downsampled_to_fullstack_map,
                self.params.downsampled_to_fullstack.save_image_type,
                &mut fullstack,
            )
            .await?;

        let template = if layout.template.is_file() {
            ArtifactExists {
                stage,
                path: &layout.template,
            }
            .log();
            self.load(stage, &layout.template).await?
        } else {
            let source = self
                .cached(stage, &self.layout.sample.template, &mut fullstack)
                .await?;
            let template = self.downsample(source, &to_downsampled).await?;
            if settings.save_template {
                self.save(stage, &template, &layout.template).await?;
            } else {
                ArtifactNotRequested {
                    stage,
                    artifact: "template",
                }
                .log();
            }
            template
        };
        drop(fullstack);

        if settings.save_images {
            for image in &self.layout.sample.images {
                if image.downsampled.is_file() {
                    ArtifactExists {
                        stage,
                        path: &image.downsampled,
                    }
                    .log();
                    continue;
                }
                let source = self.load(stage, &image.source).await?;
                let downsampled = self.downsample(&source, &to_downsampled).await?;
                self.save(stage, &downsampled, &image.downsampled).await?;
            }
        } else {
            ArtifactNotRequested {
                stage,
                artifact: "images",
            }
            .log();
        }

        Ok(Downsampled {
            to_downsampled,
            to_fullstack,
            template,
        })
    }

    /// Load a scaling map, or build it from the fullstack template and write it.
    async fn scaling_map(
        &self,
        stage: Stage,
        path: &Path,
        build: ScalingMapBuilder,
        format: ImageFormat,
        fullstack: &mut Option<R::Image>,
    ) -> PipelineResult<ParameterMap> {
        if path.is_file() {
            ArtifactExists { stage, path }.log();
            return Ok(ParameterMap::load(path).await?);
        }

        let template = self
            .cached(stage, &self.layout.sample.template, fullstack)
            .await?;
        let size = self.registrar.image_size(template);
        let base = ParameterMap::load(&self.layout.scaling_parameters).await?;
        let map = build(&base, &self.layout.scale, size, format);

        map.save(path).await?;
        ArtifactSaved { stage, path }.log();
        Ok(map)
    }

    /// Fullstack image to downsampled space, median filtered first when
    /// `adaptive-filter` is set.
    async fn downsample(&self, image: &R::Image, to_downsampled: &ParameterMap) -> PipelineResult<R::Image> {
        let stage = Stage::FullstackToDownsampled;
        let transforms = slice::from_ref(to_downsampled);
        if self.params.fullstack_to_downsampled.adaptive_filter {
            let filter = FilterPipeline::adaptive_downsampling(&self.layout.scale);
            let filtered = self.filter(stage, image, &filter).await?;
            self.transform(stage, &filtered, transforms).await
        } else {
            self.transform(stage, image, transforms).await
        }
    }

    async fn register_downsampled_to_ccf(
        &self,
        downsampled: &R::Image,
        ccf: &mut CcfImages<R::Image>,
    ) -> PipelineResult<Vec<ParameterMap>> {
        let stage = Stage::DownsampledToCcf;
        StageStarted { stage }.log();
        let layout = &self.layout.downsampled_to_ccf;

        if let Some(transforms) = self.existing_transforms(stage, &layout.transform_parameters).await? {
            return Ok(transforms);
        }
        let ccf_template = self.cached(stage, &self.layout.ccf.template, &mut ccf.template).await?;
        self.run_registration(
            stage,
            &layout.parameters_files,
            &layout.transform_parameters,
            &self.params.downsampled_to_ccf.prefilter,
            downsampled,
            ccf_template,
        )
        .await
    }

    async fn transform_downsampled_to_ccf(
        &self,
        downsampled: &Downsampled<R::Image>,
        transforms: &[ParameterMap],
    ) -> PipelineResult<()> {
        let stage = Stage::DownsampledToCcf;
        let layout = &self.layout.downsampled_to_ccf;
        let settings = &self.params.downsampled_to_ccf;

        if !settings.save_template {
            ArtifactNotRequested {
                stage,
                artifact: "template",
            }
            .log();
        } else if layout.template.is_file() {
            ArtifactExists {
                stage,
                path: &layout.template,
            }
            .log();
        } else {
            self.transform_and_save(stage, &downsampled.template, transforms, &layout.template)
                .await?;
        }

        if !settings.save_images {
            ArtifactNotRequested {
                stage,
                artifact: "images",
            }
            .log();
            return Ok(());
        }
        for image in &self.layout.sample.images {
            if image.in_ccf.is_file() {
                ArtifactExists {
                    stage,
                    path: &image.in_ccf,
                }
                .log();
                continue;
            }
            let in_sample = if image.downsampled.is_file() {
                self.load(stage, &image.downsampled).await?
            } else {
                let source = self.load(stage, &image.source).await?;
                self.downsample(&source, &downsampled.to_downsampled).await?
            };
            self.transform_and_save(stage, &in_sample, transforms, &image.in_ccf)
                .await?;
        }
        Ok(())
    }

    async fn register_ccf_to_downsampled(
        &self,
        downsampled: &R::Image,
        ccf: &mut CcfImages<R::Image>,
    ) -> PipelineResult<Vec<ParameterMap>> {
        let stage = Stage::CcfToDownsampled;
        StageStarted { stage }.log();
        let layout = &self.layout.ccf_to_downsampled;

        if let Some(transforms) = self.existing_transforms(stage, &layout.transform_parameters).await? {
            return Ok(transforms);
        }
        let ccf_template = self.cached(stage, &self.layout.ccf.template, &mut ccf.template).await?;
        self.run_registration(
            stage,
            &layout.parameters_files,
            &layout.transform_parameters,
            &self.params.ccf_to_downsampled.prefilter,
            ccf_template,
            downsampled,
        )
        .await
    }

    async fn transform_ccf_to_downsampled(
        &self,
        ccf: &mut CcfImages<R::Image>,
        transforms: &[ParameterMap],
    ) -> PipelineResult<CcfInSample<R::Image>> {
        let stage = Stage::CcfToDownsampled;
        let layout = &self.layout.ccf_to_downsampled;
        let settings = &self.params.ccf_to_downsampled;
        let mut in_sample = CcfInSample {
            template: None,
            annotation: None,
        };

        if !settings.save_template {
            ArtifactNotRequested {
                stage,
                artifact: "template",
            }
            .log();
        } else if layout.template.is_file() {
            ArtifactExists {
                stage,
                path: &layout.template,
            }
            .log();
        } else {
            let template = self.cached(stage, &self.layout.ccf.template, &mut ccf.template).await?;
            in_sample.template = Some(
                self.transform_and_save(stage, template, transforms, &layout.template)
                    .await?,
            );
        }

        if !settings.save_annotation {
            ArtifactNotRequested {
                stage,
                artifact: "annotation",
            }
            .log();
        } else if layout.annotation.is_file() {
            ArtifactExists {
                stage,
                path: &layout.annotation,
            }
            .log();
        } else {
            let annotation = self
                .cached(stage, &self.layout.ccf.annotation, &mut ccf.annotation)
                .await?;
            in_sample.annotation = Some(
                self.transform_and_save(stage, annotation, &nearest_neighbour(transforms), &layout.annotation)
                    .await?,
            );
        }

        Ok(in_sample)
    }

    async fn transform_downsampled_to_fullstack(
        &self,
        ccf: &mut CcfImages<R::Image>,
        ccf_to_ds: &[ParameterMap],
        to_fullstack: &ParameterMap,
        in_sample: CcfInSample<R::Image>,
    ) -> PipelineResult<()> {
        let stage = Stage::DownsampledToFullstack;
        StageStarted { stage }.log();
        let layout = &self.layout.downsampled_to_fullstack;
        let settings = &self.params.downsampled_to_fullstack;
        let to_fullstack = slice::from_ref(to_fullstack);

        if !settings.save_template {
            ArtifactNotRequested {
                stage,
                artifact: "template",
            }
            .log();
        } else if layout.template.is_file() {
            ArtifactExists {
                stage,
                path: &layout.template,
            }
            .log();
        } else {
            let template = match in_sample.template {
                Some(template) => template,
                None => {
                    self.ccf_in_sample(
                        stage,
                        &self.layout.ccf_to_downsampled.template,
                        &self.layout.ccf.template,
                        &mut ccf.template,
                        ccf_to_ds,
                    )
                    .await?
                }
            };
            self.transform_and_save(stage, &template, to_fullstack, &layout.template)
                .await?;
        }

        if !settings.save_annotation {
            ArtifactNotRequested {
                stage,
                artifact: "annotation",
            }
            .log();
        } else if layout.annotation.is_file() {
            ArtifactExists {
                stage,
                path: &layout.annotation,
            }
            .log();
        } else {
            let annotation = match in_sample.annotation {
                Some(annotation) => annotation,
                None => {
                    self.ccf_in_sample(
                        stage,
                        &self.layout.ccf_to_downsampled.annotation,
                        &self.layout.ccf.annotation,
                        &mut ccf.annotation,
                        &nearest_neighbour(ccf_to_ds),
                    )
                    .await?
                }
            };
            self.transform_and_save(stage, &annotation, &nearest_neighbour(to_fullstack), &layout.annotation)
                .await?;
        }

        Ok(())
    }

    /// A CCF image in downsampled space: the saved copy when there is one,
    /// otherwise transformed from the CCF.
    async fn ccf_in_sample(
        &self,
        stage: Stage,
        saved: &Path,
        source: &Path,
        slot: &mut Option<R::Image>,
        transforms: &[ParameterMap],
    ) -> PipelineResult<R::Image> {
        if saved.is_file() {
            return self.load(stage, saved).await;
        }
        let image = self.cached(stage, source, slot).await?;
        self.transform(stage, image, transforms).await
    }

    /// Transform parameter maps of a registration whose every file exists.
    ///
    /// `None` when any file is missing; [`run_registration`](Self::run_registration)
    /// then rewrites the full set.
    async fn existing_transforms(
        &self,
        stage: Stage,
        paths: &[PathBuf],
    ) -> PipelineResult<Option<Vec<ParameterMap>>> {
        if !paths.iter().all(|path| path.is_file()) {
            return Ok(None);
        }
        RegistrationSkipped {
            stage,
            transforms: paths.len(),
        }
        .log();

        let mut transforms = Vec::with_capacity(paths.len());
        for path in paths {
            transforms.push(ParameterMap::load(path).await?);
        }
        Ok(Some(transforms))
    }

    async fn run_registration(
        &self,
        stage: Stage,
        parameters_files: &[PathBuf],
        transform_parameters: &[PathBuf],
        prefilter: &str,
        moving: &R::Image,
        fixed: &R::Image,
    ) -> PipelineResult<Vec<ParameterMap>> {
        let selector: FilterSelector = prefilter.parse()?;

        let mut parameters = Vec::with_capacity(parameters_files.len());
        for file in parameters_files {
            parameters.push(ParameterMap::load(file).await?);
        }

        let filter_text = selector.pipeline().map(ToString::to_string);
        let starting = RegistrationStarted {
            stage,
            registrar: self.registrar.name(),
            passes: parameters.len(),
            prefilter: filter_text.as_deref(),
        };
        starting.log();
        let span = starting.span("run_registration");
        let started = Instant::now();

        let registered = match selector.pipeline() {
            Some(filter) => {
                let moving = self.filter(stage, moving, filter).await?;
                let fixed = self.filter(stage, fixed, filter).await?;
                self.registrar
                    .register(&moving, &fixed, &parameters)
                    .instrument(span)
                    .await
            }
            None => {
                self.registrar
                    .register(moving, fixed, &parameters)
                    .instrument(span)
                    .await
            }
        };
        let transforms = registered.map_err(PipelineError::registrar(stage, "register images"))?;

        if transforms.len() != transform_parameters.len() {
            return Err(PipelineError::TransformCountMismatch {
                stage,
                expected: transform_parameters.len(),
                returned: transforms.len(),
            });
        }
        for (map, path) in transforms.iter().zip(transform_parameters) {
            map.save(path).await?;
            ArtifactSaved { stage, path }.log();
        }

        RegistrationCompleted {
            stage,
            transforms: transforms.len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(transforms)
    }

    async fn cached<'a>(
        &self,
        stage: Stage,
        path: &Path,
        slot: &'a mut Option<R::Image>,
    ) -> PipelineResult<&'a R::Image> {
        let image = match slot.take() {
            Some(image) => image,
            None => self.load(stage, path).await?,
        };
        Ok(slot.insert(image))
    }

    async fn transform_and_save(
        &self,
        stage: Stage,
        image: &R::Image,
        transforms: &[ParameterMap],
        path: &Path,
    ) -> PipelineResult<R::Image> {
        let moved = self.transform(stage, image, transforms).await?;
        self.save(stage, &moved, path).await?;
        Ok(moved)
    }

    async fn load(&self, stage: Stage, path: &Path) -> PipelineResult<R::Image> {
        self.registrar
            .load_image(path)
            .await
            .map_err(PipelineError::registrar(stage, "load image"))
    }

    async fn filter(&self, stage: Stage, image: &R::Image, filter: &FilterPipeline) -> PipelineResult<R::Image> {
        self.registrar
            .apply_filter(image, filter)
            .await
            .map_err(PipelineError::registrar(stage, "filter image"))
    }

    async fn transform(
        &self,
        stage: Stage,
        image: &R::Image,
        transforms: &[ParameterMap],
    ) -> PipelineResult<R::Image> {
        self.registrar
            .transform(image, transforms)
            .await
            .map_err(PipelineError::registrar(stage, "transform image"))
    }

    async fn save(&self, stage: Stage, image: &R::Image, path: &Path) -> PipelineResult<()> {
        self.registrar
            .save_image(image, path)
            .await
            .map_err(PipelineError::registrar(stage, "save image"))?;
        ArtifactSaved { stage, path }.log();
        Ok(())
    }
}

fn nearest_neighbour(transforms: &[ParameterMap]) -> Vec<ParameterMap> {
    transforms.iter().map(ParameterMap::with_nearest_neighbour).collect()
}
