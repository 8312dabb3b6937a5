use async_trait::async_trait;
use std::path::Path;

use crate::elastix::ParameterMap;
use crate::filter::FilterPipeline;

/// Error reported by a registration engine.
pub type RegistrarError = Box<dyn std::error::Error + Send + Sync>;

/// The image registration engine the pipeline drives.
///
/// Implementations wrap elastix/transformix (or anything that speaks their
/// parameter maps). The pipeline only moves images between calls and never
/// looks inside them.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// In-memory image handle.
    type Image: Send + Sync;

    async fn load_image(&self, path: &Path) -> Result<Self::Image, RegistrarError>;

    /// Image size in voxels, x, y, z.
    fn image_size(&self, image: &Self::Image) -> [u64; 3];

    /// Filtered copy of `image`.
    async fn apply_filter(
        &self,
        image: &Self::Image,
        filter: &FilterPipeline,
    ) -> Result<Self::Image, RegistrarError>;

    /// Resample `image` through the chain of transform parameter maps.
    async fn transform(
        &self,
        image: &Self::Image,
        transforms: &[ParameterMap],
    ) -> Result<Self::Image, RegistrarError>;

    /// Register `moving` onto `fixed`, running one elastix pass per entry of
    /// `parameters`. Returns one transform parameter map per pass, in order.
    async fn register(
        &self,
        moving: &Self::Image,
        fixed: &Self::Image,
        parameters: &[ParameterMap],
    ) -> Result<Vec<ParameterMap>, RegistrarError>;

    async fn save_image(&self, image: &Self::Image, path: &Path) -> Result<(), RegistrarError>;

    fn name(&self) -> &'static str;
}
