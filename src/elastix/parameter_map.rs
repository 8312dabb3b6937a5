// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::error::{ElastixError, ElastixResult};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const FINAL_BSPLINE_INTERPOLATION_ORDER: &str = "FinalBSplineInterpolationOrder";

/// One value of an elastix parameter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// Quoted string, e.g. `"AffineTransform"`
    Text(String),
    /// Bare token, kept verbatim so numbers print exactly as read
    Number(String),
}

impl ParameterValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::Text(value.into())
    }

    pub fn number(value: impl fmt::Display) -> Self {
        ParameterValue::Number(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParameterValue::Text(s) | ParameterValue::Number(s) => s,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) => write!(f, "\"{}\"", s),
            ParameterValue::Number(s) => f.write_str(s),
        }
    }
}

/// An elastix/transformix parameter map.
///
/// The text format is one `(Key value value ...)` entry per line with `//`
/// line comments. Entries keep the order they were read or first set in;
/// comments are not kept.
///
/// ```rust
/// use brainregister::elastix::ParameterMap;
///
/// let map: ParameterMap = r#"
/// // scaling
/// (Transform "AffineTransform")
/// (Size 10 20 30)
/// "#.parse().unwrap();
///
/// assert_eq!(map.get_str("Transform"), Some("AffineTransform"));
/// assert_eq!(map.to_string(), "(Transform \"AffineTransform\")\n(Size 10 20 30)\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterMap {
    entries: Vec<(String, Vec<ParameterValue>)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[ParameterValue]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value of an entry
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(ParameterValue::as_str)
    }

    /// Replace an entry in place, or append it when the key is new.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<ParameterValue>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, vec![ParameterValue::text(value)]);
    }

    pub fn set_numbers<T: fmt::Display>(&mut self, key: impl Into<String>, values: impl IntoIterator<Item = T>) {
        self.set(key, values.into_iter().map(ParameterValue::number).collect());
    }

    /// Copy of this map resampling with nearest-neighbour interpolation.
    ///
    /// Label images such as the CCF annotation must not be interpolated.
    pub fn with_nearest_neighbour(&self) -> Self {
        let mut map = self.clone();
        map.set_numbers(FINAL_BSPLINE_INTERPOLATION_ORDER, [0]);
        map
    }

    /// Read a parameter file.
    pub async fn load(path: &Path) -> ElastixResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ElastixError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        content.parse().map_err(|e| ElastixError::Malformed {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    /// Write the map to a parameter file, replacing any existing file.
    pub async fn save(&self, path: &Path) -> ElastixResult<()> {
        tokio::fs::write(path, self.to_string())
            .await
            .map_err(|source| ElastixError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl fmt::Display for ParameterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, values) in &self.entries {
            write!(f, "({}", key)?;
            for value in values {
                write!(f, " {}", value)?;
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

impl FromStr for ParameterMap {
    type Err = ElastixError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut map = ParameterMap::new();
        for (index, raw) in content.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            let (key, values) = parse_entry(line).map_err(|reason| ElastixError::syntax(index + 1, reason))?;
            map.set(key, values);
        }
        Ok(map)
    }
}

/// Drop a trailing `//` comment that is not inside a quoted string.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let bytes = line.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'/' if !in_quotes && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_entry(line: &str) -> Result<(String, Vec<ParameterValue>), String> {
    let body = line
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("expected '(Key value ...)', found '{}'", line))?;

    let mut rest = body.trim_start();
    let key_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let key = &rest[..key_end];
    if key.is_empty() || key.contains('"') {
        return Err(format!("missing parameter name in '{}'", line));
    }
    rest = rest[key_end..].trim_start();

    let mut values = Vec::new();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted
                .find('"')
                .ok_or_else(|| format!("unterminated string in parameter '{}'", key))?;
            values.push(ParameterValue::Text(quoted[..end].to_string()));
            rest = quoted[end + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            values.push(ParameterValue::Number(rest[..end].to_string()));
            rest = rest[end..].trim_start();
        }
    }

    Ok((key.to_string(), values))
}
