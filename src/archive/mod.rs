// src/archive/mod.rs
pub mod encoding;
pub mod validate;

pub use validate::{classify, ArchiveStatus};

use serde_json::Value;
use std::{
    fs::File,
    io::{Read, Seek},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use zip::{result::ZipError, ZipArchive};

use self::encoding::repair_value;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("cannot open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable zip container: {0}")]
    Unreadable(#[from] ZipError),
}

/// A data download package opened read-only for one extraction attempt.
///
/// Entry names are captured once, in archive-native order, when the package is opened.
pub struct DdpArchive<R> {
    inner: ZipArchive<R>,
    names: Vec<String>,
}

impl DdpArchive<File> {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file)
    }
}

impl<R: Read + Seek> DdpArchive<R> {
    /// Read the central directory and every entry header.
    /// Any structural problem surfaces here as [`ArchiveError::Unreadable`].
    #[instrument(level = "debug", skip(reader))]
    pub fn new(reader: R) -> Result<Self, ArchiveError> {
        let mut inner = ZipArchive::new(reader)?;
        let mut names = Vec::with_capacity(inner.len());
        for i in 0..inner.len() {
            let entry = inner.by_index_raw(i)?;
            names.push(entry.name().to_string());
        }
        debug!(entries = names.len(), "opened archive");
        Ok(Self { inner, names })
    }

    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of the first `.json` entry whose name contains `pattern`.
    pub fn find_json(&self, pattern: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|name| name.ends_with(".json") && name.contains(pattern))
    }

    /// Raw bytes of the entry at `index`.
    pub fn read_entry(&mut self, index: usize) -> Result<Vec<u8>, ArchiveError> {
        let mut entry = self.inner.by_index(index)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf).map_err(ZipError::Io)?;
        Ok(buf)
    }

    /// Find and decode the record for `pattern`.
    ///
    /// Only the first matching entry is considered. A missing entry, an unreadable
    /// entry and malformed JSON all come back as `None`: a broken file must not
    /// take the rest of the package down with it.
    #[instrument(level = "debug", skip(self))]
    pub fn locate(&mut self, pattern: &str) -> Option<Value> {
        let Some(index) = self.find_json(pattern) else {
            debug!("no entry matches");
            return None;
        };
        let name = self.names[index].clone();

        let bytes = match self.read_entry(index) {
            Ok(b) => b,
            Err(e) => {
                warn!(entry = %name, "failed to read entry: {}", e);
                return None;
            }
        };

        // some exports prefix their JSON with a UTF-8 BOM
        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => {
                debug!(entry = %name, bytes = bytes.len(), "decoded record");
                Some(repair_value(value))
            }
            Err(e) => {
                warn!(entry = %name, "malformed JSON: {}", e);
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixture::zip_with;
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn locates_nested_entry_by_substring() -> Result<()> {
        let reader = zip_with(&[
            ("export_2023/readme.txt", "hi"),
            (
                "export_2023/ads_information/ads_and_topics/ads_clicked.json",
                r#"{"impressions_history_ads_clicked": []}"#,
            ),
        ]);
        let mut archive = DdpArchive::new(reader)?;
        let record = archive.locate("ads_clicked").expect("record");
        assert_eq!(record, json!({"impressions_history_ads_clicked": []}));
        Ok(())
    }

    #[test]
    fn only_json_entries_match() -> Result<()> {
        let reader = zip_with(&[("ads_clicked.html", "<html></html>")]);
        let mut archive = DdpArchive::new(reader)?;
        assert!(archive.locate("ads_clicked").is_none());
        Ok(())
    }

    #[test]
    fn first_match_in_archive_order_wins() -> Result<()> {
        let reader = zip_with(&[
            ("b/following.json", r#"{"which": "b"}"#),
            ("a/following.json", r#"{"which": "a"}"#),
        ]);
        let mut archive = DdpArchive::new(reader)?;
        assert_eq!(archive.locate("following"), Some(json!({"which": "b"})));
        Ok(())
    }

    #[test]
    fn malformed_json_is_not_found() -> Result<()> {
        let reader = zip_with(&[
            ("x/your_topics.json", "{ not json"),
            ("y/your_topics.json", r#"{"topics_your_topics": []}"#),
        ]);
        let mut archive = DdpArchive::new(reader)?;
        // the first candidate is malformed; later candidates are not consulted
        assert!(archive.locate("your_topics").is_none());
        Ok(())
    }

    #[test]
    fn bom_and_mojibake_are_handled() -> Result<()> {
        let body = "\u{feff}{\"Ge\\u00c3\\u00a4ndert\": 1}";
        let reader = zip_with(&[("profile_changes.json", body)]);
        let mut archive = DdpArchive::new(reader)?;
        assert_eq!(archive.locate("profile_changes"), Some(json!({"Geändert": 1})));
        Ok(())
    }

    #[test]
    fn non_zip_is_unreadable() {
        let err = DdpArchive::new(Cursor::new(b"definitely not a zip".to_vec()));
        assert!(matches!(err, Err(ArchiveError::Unreadable(_))));
    }
}
