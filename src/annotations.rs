// src/annotations.rs
//! Per-image feature counts (faces found) joined into the media datasets.
//!
//! Detection itself is not done here: a [`FeatureDetector`] supplies the counts
//! and the pipeline collects them into an [`AnnotationLookup`].

use anyhow::{Context, Result};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::Path,
};
use tracing::info;

static IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".heic"];

/// Whether an archive entry is an image the scanner should visit.
pub fn is_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Archive path → detected feature count. Built once per archive, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationLookup {
    counts: BTreeMap<String, u32>,
    /// file name → every stored path ending in it
    by_file_name: BTreeMap<String, BTreeSet<String>>,
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `short` is `long` with one or more leading folders removed.
fn is_path_suffix(long: &str, short: &str) -> bool {
    long.len() > short.len()
        && long.ends_with(short)
        && long.as_bytes()[long.len() - short.len() - 1] == b'/'
}

impl AnnotationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, count: u32) {
        let path = path.into();
        self.by_file_name
            .entry(file_name(&path).to_string())
            .or_default()
            .insert(path.clone());
        self.counts.insert(path, count);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count for `uri`. Media URIs are relative to the export root while archive
    /// paths may carry a top-level folder, so a match on either side's path suffix counts.
    /// Among several suffix matches the shortest path wins, then the lexically first.
    pub fn get(&self, uri: &str) -> Option<u32> {
        let uri = uri.trim_start_matches('/');
        if let Some(n) = self.counts.get(uri) {
            return Some(*n);
        }
        self.by_file_name
            .get(file_name(uri))?
            .iter()
            .filter(|path| is_path_suffix(path, uri) || is_path_suffix(uri, path))
            .min_by_key(|path| path.len())
            .and_then(|path| self.counts.get(path.as_str()).copied())
    }

    /// [`get`](Self::get), with an unknown image meaning nothing was detected.
    pub fn feature_count(&self, uri: &str) -> u32 {
        self.get(uri).unwrap_or(0)
    }
}

impl FromIterator<(String, u32)> for AnnotationLookup {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (path, count) in iter {
            lookup.insert(path, count);
        }
        lookup
    }
}

/// Producer of per-image feature counts.
pub trait FeatureDetector {
    /// Count features in one image. `bytes` is empty when [`reads_content`](Self::reads_content) is false.
    fn detect(&self, path: &str, bytes: &[u8]) -> Result<u32>;

    /// Whether the scanner must decompress each image before calling [`detect`](Self::detect).
    fn reads_content(&self) -> bool {
        true
    }
}

/// Reports nothing for every image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl FeatureDetector for NoDetector {
    fn detect(&self, _path: &str, _bytes: &[u8]) -> Result<u32> {
        Ok(0)
    }

    fn reads_content(&self) -> bool {
        false
    }
}

/// Counts computed ahead of time, read from a JSON object `{"<path>": <count>}`.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedDetector {
    lookup: AnnotationLookup,
}

impl PrecomputedDetector {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading annotations {:?}", path))?;
        let counts: HashMap<String, u32> = serde_json::from_str(&text)
            .with_context(|| format!("parsing annotations {:?}", path))?;
        info!(path = %path.display(), images = counts.len(), "loaded precomputed annotations");
        Ok(Self {
            lookup: counts.into_iter().collect(),
        })
    }

    pub fn from_lookup(lookup: AnnotationLookup) -> Self {
        Self { lookup }
    }
}

impl FeatureDetector for PrecomputedDetector {
    fn detect(&self, path: &str, _bytes: &[u8]) -> Result<u32> {
        Ok(self.lookup.feature_count(path))
    }

    fn reads_content(&self) -> bool {
        false
    }
}
