// src/extract/names.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::HashSet, fs, path::Path};
use tracing::{info, warn};

static TOKEN_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s._]+").expect("token split regex should compile"));

/// Reference list of known first names.
///
/// Matching is exact and case-sensitive: "Anna" matches "Anna", not "anna".
#[derive(Debug, Clone, Default)]
pub struct NameList {
    names: HashSet<String>,
}

impl NameList {
    /// Read a line-delimited name file. Blank lines and `#` comments are skipped.
    /// A missing file is a configuration error for the whole run.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading first-name list {:?}", path))?;
        let list = Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
        if list.is_empty() {
            warn!(path = %path.display(), "first-name list is empty");
        } else {
            info!(path = %path.display(), names = list.len(), "loaded first-name list");
        }
        Ok(list)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.names.contains(token)
    }

    /// Whether any whitespace/dot/underscore-separated token of `text` is a known first name.
    pub fn looks_like_name(&self, text: &str) -> bool {
        TOKEN_SPLIT
            .split(text)
            .filter(|t| !t.is_empty())
            .any(|t| self.contains(t))
    }
}
