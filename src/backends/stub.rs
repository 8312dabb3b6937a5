// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::elastix::ParameterMap;
use crate::filter::FilterPipeline;
use crate::traits::{Registrar, RegistrarError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Image handle produced by [`StubRegistrar`]; the label records how it was made.
#[derive(Debug, Clone, PartialEq)]
pub struct StubImage {
    pub label: String,
    pub size: [u64; 3],
}

/// One call made to a [`StubRegistrar`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrarCall {
    Load(PathBuf),
    Filter { image: String, filter: String },
    Transform { image: String, transforms: usize },
    Register { moving: String, fixed: String, passes: usize },
    Save(PathBuf),
}

/// A registrar that records every call and writes placeholder images.
///
/// Loaded images take their label from the file name and report
/// `fullstack_size`; transformed images take their size from the last map's
/// `Size` entry when it has one.
pub struct StubRegistrar {
    pub fullstack_size: [u64; 3],
    /// Number of transform maps `register` leaves off its result
    pub drop_transforms: usize,
    /// Operation name that fails, e.g. `"register"`
    pub fail_on: Option<&'static str>,
    calls: Mutex<Vec<RegistrarCall>>,
}

impl StubRegistrar {
    pub fn new() -> Self {
        Self {
            fullstack_size: [1000, 2000, 250],
            drop_transforms: 0,
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(operation: &'static str) -> Self {
        Self {
            fail_on: Some(operation),
            ..Self::new()
        }
    }

    pub async fn calls(&self) -> Vec<RegistrarCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, operation: &'static str, call: RegistrarCall) -> Result<(), RegistrarError> {
        self.calls.lock().await.push(call);
        if self.fail_on == Some(operation) {
            return Err(format!("stub {} failure", operation).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Registrar for StubRegistrar {
    type Image = StubImage;

    async fn load_image(&self, path: &Path) -> Result<StubImage, RegistrarError> {
        self.record("load", RegistrarCall::Load(path.to_path_buf())).await?;
        tokio::fs::metadata(path).await?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(StubImage {
            label,
            size: self.fullstack_size,
        })
    }

    fn image_size(&self, image: &StubImage) -> [u64; 3] {
        image.size
    }

    async fn apply_filter(
        &self,
        image: &StubImage,
        filter: &FilterPipeline,
    ) -> Result<StubImage, RegistrarError> {
        self.record(
            "filter",
            RegistrarCall::Filter {
                image: image.label.clone(),
                filter: filter.to_string(),
            },
        )
        .await?;
        Ok(StubImage {
            label: format!("filter({})", image.label),
            size: image.size,
        })
    }

    async fn transform(
        &self,
        image: &StubImage,
        transforms: &[ParameterMap],
    ) -> Result<StubImage, RegistrarError> {
        self.record(
            "transform",
            RegistrarCall::Transform {
                image: image.label.clone(),
                transforms: transforms.len(),
            },
        )
        .await?;

        let size = transforms
            .last()
            .and_then(|map| map.get("Size"))
            .and_then(|values| {
                let parsed: Vec<u64> = values.iter().filter_map(|v| v.as_str().parse().ok()).collect();
                <[u64; 3]>::try_from(parsed).ok()
            })
            .unwrap_or(image.size);

        Ok(StubImage {
            label: format!("transform({})", image.label),
            size,
        })
    }

    async fn register(
        &self,
        moving: &StubImage,
        fixed: &StubImage,
        parameters: &[ParameterMap],
    ) -> Result<Vec<ParameterMap>, RegistrarError> {
        self.record(
            "register",
            RegistrarCall::Register {
                moving: moving.label.clone(),
                fixed: fixed.label.clone(),
                passes: parameters.len(),
            },
        )
        .await?;

        let returned = parameters.len().saturating_sub(self.drop_transforms);
        Ok(parameters
            .iter()
            .take(returned)
            .enumerate()
            .map(|(pass, params)| {
                let mut map = ParameterMap::new();
                map.set_text(
                    "Transform",
                    params.get_str("Transform").unwrap_or("AffineTransform"),
                );
                map.set_numbers("Pass", [pass]);
                map.set_numbers("Size", fixed.size);
                map.set_numbers("FinalBSplineInterpolationOrder", [3]);
                map
            })
            .collect())
    }

    async fn save_image(&self, image: &StubImage, path: &Path) -> Result<(), RegistrarError> {
        self.record("save", RegistrarCall::Save(path.to_path_buf())).await?;
        tokio::fs::write(path, &image.label).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
