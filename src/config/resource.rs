// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Path references in parameter files.
//!
//! Every path-valued entry is either relative to the file that contains it or,
//! when prefixed with `brainregister:`, a resource shipped with this crate:
//!
//! ```yaml
//! downsampled-to-ccf-parameters-files:
//!   - brainregister:affine
//!   - my-params/bspline.txt
//! fullstack-to-downsampled-ccf-path: brainregister:resource/allen-ccf/ccf_parameters.yaml
//! ```

use crate::config::consts::{
    BUILTIN_RESOURCES, LEGACY_ALIASES, RESOURCES_DIR_NAME, RESOURCES_ENV_VAR, RESOURCE_PATH_PREFIX,
    RESOURCE_SCHEME,
};
use crate::errors::ResourceError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Directory holding the resources referenced through `brainregister:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot(PathBuf);

impl ResourceRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resource root from `BRAINREGISTER_RESOURCES`, falling back to the
    /// `resources/` directory shipped with the crate.
    pub fn from_env() -> Self {
        match std::env::var_os(RESOURCES_ENV_VAR) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::bundled(),
        }
    }

    /// The `resources/` directory shipped with the crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join(RESOURCES_DIR_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Join a relative resource path onto the root, refusing paths that escape it.
    pub fn join(&self, relative: &str) -> Result<PathBuf, ResourceError> {
        let rel = Path::new(relative);
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || relative.is_empty() {
            return Err(ResourceError::EscapesRoot(relative.to_string()));
        }
        Ok(self.0.join(rel))
    }
}

impl Default for ResourceRoot {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A parsed path reference from a parameters file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// `brainregister:<name>` - a named resource or `resource/<path>`
    Builtin(String),
    /// A path relative to the referencing file (or absolute)
    Path(PathBuf),
}

impl ResourceRef {
    /// Parse a reference. Parsing never fails; unknown built-in names are
    /// reported when the reference is resolved.
    pub fn parse(value: &str) -> Self {
        if let Some(name) = value.strip_prefix(RESOURCE_SCHEME) {
            return ResourceRef::Builtin(name.trim().to_string());
        }
        if let Some((_, name)) = LEGACY_ALIASES.iter().find(|(alias, _)| *alias == value) {
            return ResourceRef::Builtin((*name).to_string());
        }
        ResourceRef::Path(PathBuf::from(value))
    }

    /// Resolve to a concrete path.
    ///
    /// Relative paths are joined onto `base_dir`; built-ins onto the resource root.
    pub fn resolve(&self, base_dir: &Path, root: &ResourceRoot) -> Result<PathBuf, ResourceError> {
        match self {
            ResourceRef::Path(path) if path.is_absolute() => Ok(normalize(path)),
            ResourceRef::Path(path) => Ok(normalize(&base_dir.join(path))),
            ResourceRef::Builtin(name) => {
                if let Some(rel) = name.strip_prefix(RESOURCE_PATH_PREFIX) {
                    return root.join(rel);
                }
                BUILTIN_RESOURCES
                    .iter()
                    .find(|(builtin, _)| *builtin == name.as_str())
                    .map(|(_, rel)| root.0.join(rel))
                    .ok_or_else(|| ResourceError::UnknownBuiltin(name.clone()))
            }
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Builtin(name) => write!(f, "{}{}", RESOURCE_SCHEME, name),
            ResourceRef::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(ResourceRef::parse(&value))
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// Works on paths that do not exist yet, unlike `fs::canonicalize`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Path of `target` relative to the directory `base`.
///
/// Both paths are made absolute against the current directory first.
pub fn relative_to(target: &Path, base: &Path) -> std::io::Result<PathBuf> {
    let target = normalize(&std::path::absolute(target)?);
    let base = normalize(&std::path::absolute(base)?);

    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Ok(rel)
}
