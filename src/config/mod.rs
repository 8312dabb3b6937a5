// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod ccf;
mod loader;
mod orientation;
mod resource;
mod stage;
mod template;
mod validation;

pub mod consts;

pub use ccf::{load_ccf_params, resolve_ccf_params_path, validate_ccf_params, CcfParams};
pub use loader::{
    load_and_validate_params, load_params, BrainRegisterParams, CcfToDownsampledParams,
    DownsampledToCcfParams, DownsampledToFullstackParams, FullstackToDownsampledParams,
    ImageFormat, Resolution, SampleTemplateParams,
};
pub use orientation::Orientation;
pub use resource::{normalize, relative_to, ResourceRef, ResourceRoot};
pub use stage::Stage;
pub use template::{create_parameters_file, ParamsFileOptions};
pub use validation::{check_inputs_exist, validate_params};
