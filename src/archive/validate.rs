// src/archive/validate.rs

use serde::Serialize;
use std::io::{Read, Seek};
use tracing::{info, instrument};

use super::DdpArchive;

/// Path fragments found in every Instagram export, old and new layouts.
static CATEGORY_MARKERS: &[&str] = &[
    "ads_and_topics/",
    "ads_information/",
    "followers_and_following/",
    "your_instagram_activity/",
    "personal_information/",
];

/// Files that only exist when the export was rendered as HTML instead of JSON.
static HTML_EXPORT_MARKERS: &[&str] = &["start_here.html", "index.html"];

/// Outcome of inspecting a package before any extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    Valid,
    InvalidWrongFormat,
    InvalidNotRecognized,
    InvalidUnreadable,
}

impl ArchiveStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ArchiveStatus::Valid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveStatus::Valid => "valid",
            ArchiveStatus::InvalidWrongFormat => "invalid_wrong_format",
            ArchiveStatus::InvalidNotRecognized => "invalid_not_recognized",
            ArchiveStatus::InvalidUnreadable => "invalid_unreadable",
        }
    }
}

/// Classify a package from its entry names alone.
pub fn classify_names<S: AsRef<str>>(names: &[S]) -> ArchiveStatus {
    let has_category = names
        .iter()
        .any(|n| CATEGORY_MARKERS.iter().any(|m| n.as_ref().contains(m)));
    let has_html = names.iter().any(|n| {
        let n = n.as_ref();
        HTML_EXPORT_MARKERS
            .iter()
            .any(|m| n == *m || n.ends_with(&format!("/{}", m)))
    });

    match (has_category, has_html) {
        (true, false) => ArchiveStatus::Valid,
        (true, true) => ArchiveStatus::InvalidWrongFormat,
        (false, _) => ArchiveStatus::InvalidNotRecognized,
    }
}

impl<R: Read + Seek> DdpArchive<R> {
    pub fn classify(&self) -> ArchiveStatus {
        classify_names(self.entry_names())
    }
}

/// Open `reader` as a zip container and classify it. Never fails: an unopenable
/// container is itself a classification.
#[instrument(level = "info", skip(reader))]
pub fn classify<R: Read + Seek>(reader: R) -> ArchiveStatus {
    let status = match DdpArchive::new(reader) {
        Ok(archive) => archive.classify(),
        Err(e) => {
            info!("unreadable archive: {}", e);
            ArchiveStatus::InvalidUnreadable
        }
    };
    info!(status = status.as_str(), "classified archive");
    status
}
