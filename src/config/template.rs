// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Generating a parameters file for a new sample.
//!
//! Starting from a parameters template, the sample-specific keys are filled in
//! and the result is written for the user to review before registering.

use crate::config::consts::{DEFAULT_OUTPUT_DIR, PARAMETERS_FILENAME, PARAMETERS_TEMPLATE_RESOURCE};
use crate::config::{load_params, relative_to, BrainRegisterParams, ResourceRoot, Stage};
use crate::errors::{ParamsError, ParamsResult};
use crate::observability::messages::params::{OutputDirCreated, ParamsFileWritten};
use crate::observability::messages::StructuredLog;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for [`create_parameters_file`].
#[derive(Debug, Clone)]
pub struct ParamsFileOptions {
    /// Image the registration is optimised on
    pub sample_template: PathBuf,
    /// Directory the parameters file is written to, created if missing
    pub output_dir: PathBuf,
    pub file_name: String,
    /// User parameters template; the shipped template when `None`
    pub params_template: Option<PathBuf>,
    pub resources: ResourceRoot,
}

impl ParamsFileOptions {
    pub fn new(sample_template: impl Into<PathBuf>) -> Self {
        Self {
            sample_template: sample_template.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_name: PARAMETERS_FILENAME.to_string(),
            params_template: None,
            resources: ResourceRoot::default(),
        }
    }

    pub fn params_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// Write a parameters file for `options.sample_template` and return its contents.
///
/// `sample-template-path` is set relative to the output directory and
/// `sample-images` lists every other file next to the template sharing its
/// extension. Comments from the shipped template are kept; a user template is
/// written without comments.
pub fn create_parameters_file(options: &ParamsFileOptions) -> ParamsResult<BrainRegisterParams> {
    let template = &options.sample_template;
    if !template.is_file() {
        return Err(ParamsError::InvalidSampleTemplate(template.clone()));
    }

    if !options.output_dir.is_dir() {
        fs::create_dir_all(&options.output_dir).map_err(|e| ParamsError::io(&options.output_dir, e))?;
        OutputDirCreated {
            path: &options.output_dir,
        }
        .log();
    }

    let (mut params, comments) = match &options.params_template {
        Some(path) => (load_params(path)?, None),
        None => {
            let path = options.resources.join(PARAMETERS_TEMPLATE_RESOURCE)?;
            let text = fs::read_to_string(&path).map_err(|e| ParamsError::io(&path, e))?;
            let params = BrainRegisterParams::from_yaml_str(&text)
                .map_err(|source| ParamsError::Yaml { path, source })?;
            (params, Some(SectionComments::extract(&text)))
        }
    };

    params.sample.template_path = relative_to(template, &options.output_dir)
        .map_err(|e| ParamsError::io(template, e))?
        .to_string_lossy()
        .into_owned();
    params.sample.images = sibling_images(template);

    let yaml = params.to_yaml_string()?;
    let content = match comments {
        Some(comments) => comments.insert_into(&yaml),
        None => yaml,
    };

    let params_path = options.params_path();
    fs::write(&params_path, content).map_err(|e| ParamsError::io(&params_path, e))?;

    ParamsFileWritten {
        path: &params_path,
        sample_template: template,
        sample_images: params.sample.images.len(),
    }
    .log();

    Ok(params)
}

/// Names of the files beside `template` sharing its extension, sorted.
fn sibling_images(template: &Path) -> Vec<String> {
    let dir = match template.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let extension = template.extension();
    let template_name = template.file_name();

    let mut images: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == extension)
        .filter(|entry| Some(entry.file_name()) != template_name)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    images.sort();
    images
}

/// Section of a parameters file: the sample keys, or one stage's keys.
type Section = Option<Stage>;

/// Comment blocks of the shipped template, keyed by the section they introduce.
struct SectionComments(HashMap<Section, Vec<String>>);

impl SectionComments {
    fn extract(template: &str) -> Self {
        let mut blocks = HashMap::new();
        let mut pending: Vec<String> = Vec::new();
        for line in template.lines() {
            match top_level_key(line) {
                Some(key) => {
                    let section = Stage::for_key(key);
                    if !pending.is_empty() && !blocks.contains_key(&section) {
                        blocks.insert(section, std::mem::take(&mut pending));
                    }
                    pending.clear();
                }
                None if line.trim_start().starts_with('#') || line.trim().is_empty() => {
                    pending.push(line.to_string());
                }
                None => {}
            }
        }
        Self(blocks)
    }

    fn insert_into(&self, yaml: &str) -> String {
        let mut out = String::with_capacity(yaml.len() * 2);
        let mut current: Option<Section> = None;
        for line in yaml.lines() {
            if let Some(key) = top_level_key(line) {
                let section = Stage::for_key(key);
                if current != Some(section) {
                    if let Some(block) = self.0.get(&section) {
                        for comment in block {
                            out.push_str(comment);
                            out.push('\n');
                        }
                    }
                    current = Some(section);
                }
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Key of an unindented `key: value` line.
fn top_level_key(line: &str) -> Option<&str> {
    if line.starts_with(|c: char| c.is_whitespace() || c == '#' || c == '-') {
        return None;
    }
    line.split_once(':').map(|(key, _)| key.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_params, validate_params};

    fn write_stack(dir: &Path) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        for name in ["autofl.nrrd", "dapi.nrrd", "cfos.nrrd", "notes.txt"] {
            fs::write(dir.join(name), name).unwrap();
        }
        fs::create_dir_all(dir.join("nested.nrrd")).unwrap();
        dir.join("autofl.nrrd")
    }

    #[test]
    fn fills_sample_keys_and_keeps_comments() {
        let root = tempfile::tempdir().unwrap();
        let template = write_stack(&root.path().join("stacks"));
        let mut options = ParamsFileOptions::new(&template);
        options.output_dir = root.path().join("brainregister");
        options.resources = ResourceRoot::bundled();

        let params = create_parameters_file(&options).unwrap();

        assert_eq!(params.sample.template_path, "../stacks/autofl.nrrd");
        assert_eq!(params.sample.images, vec!["cfos.nrrd", "dapi.nrrd"]);

        let text = fs::read_to_string(options.params_path()).unwrap();
        for header in [
            "# SAMPLE TEMPLATE",
            "# FULLSTACK TO DOWNSAMPLED",
            "# DOWNSAMPLED TO FULLSTACK",
            "# DOWNSAMPLED TO CCF",
            "# CCF TO DOWNSAMPLED",
        ] {
            assert_eq!(text.matches(header).count(), 1, "{} in\n{}", header, text);
        }
        let ccf_header = text.find("# DOWNSAMPLED TO CCF").unwrap();
        let ccf_key = text.find("downsampled-to-ccf-path").unwrap();
        let fs_key = text.find("downsampled-to-fullstack-transform-params-filename").unwrap();
        assert!(fs_key < ccf_header && ccf_header < ccf_key);

        let reloaded = load_params(options.params_path()).unwrap();
        assert_eq!(reloaded, params);
    }

    #[test]
    fn generated_file_needs_only_a_resolution() {
        let root = tempfile::tempdir().unwrap();
        let template = write_stack(&root.path().join("stacks"));
        let mut options = ParamsFileOptions::new(&template);
        options.output_dir = root.path().join("brainregister");
        options.resources = ResourceRoot::bundled();

        let mut params = create_parameters_file(&options).unwrap();
        assert!(validate_params(&params).is_err());

        params.sample.resolution = crate::config::Resolution::new(4.0, 4.0, 10.0);
        assert_eq!(validate_params(&params), Ok(()));
    }

    #[test]
    fn user_template_is_written_without_comments() {
        let root = tempfile::tempdir().unwrap();
        let template = write_stack(&root.path().join("stacks"));
        let user_template = root.path().join("my-template.yaml");
        let builtin = fs::read_to_string(ResourceRoot::bundled().path().join(PARAMETERS_TEMPLATE_RESOURCE))
            .unwrap()
            .replace("fullstack-to-downsampled-prefix: ds_", "fullstack-to-downsampled-prefix: small_");
        fs::write(&user_template, builtin).unwrap();

        let mut options = ParamsFileOptions::new(&template);
        options.output_dir = root.path().join("out");
        options.file_name = "params.yaml".to_string();
        options.params_template = Some(user_template);

        let params = create_parameters_file(&options).unwrap();
        assert_eq!(params.fullstack_to_downsampled.prefix, "small_");

        let text = fs::read_to_string(root.path().join("out/params.yaml")).unwrap();
        assert!(!text.contains('#'));
    }

    #[test]
    fn missing_template_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let options = ParamsFileOptions::new(root.path().join("missing.nrrd"));

        let err = create_parameters_file(&options).unwrap_err();
        assert!(matches!(err, ParamsError::InvalidSampleTemplate(_)));
    }
}
