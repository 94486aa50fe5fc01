// src/extract/mod.rs
//! Field extractors: one decoded record in, one normalized table out.

pub mod activity;
pub mod ads;
pub mod aggregate;
pub mod identity;
pub mod json;
pub mod media;
pub mod names;
pub mod relationships;
pub mod timestamp;

pub use names::NameList;
pub use timestamp::{epoch_to_date, TimestampMode, SENTINEL_DATE, UTC_OFFSET_HOURS};

use serde_json::Value;
use thiserror::Error;

use crate::annotations::AnnotationLookup;
use crate::table::ResultTable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("file does not exist")]
    NotFound,

    #[error("cannot decode record: {0}")]
    Decode(String),

    #[error("unexpected record shape: {0}")]
    SchemaMismatch(String),

    #[error("cannot convert epoch timestamp {0}")]
    Timestamp(String),

    #[error("{0}")]
    Other(String),
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "not_found",
            ExtractionError::Decode(_) => "decode_error",
            ExtractionError::SchemaMismatch(_) => "schema_mismatch",
            ExtractionError::Timestamp(_) => "timestamp",
            ExtractionError::Other(_) => "other",
        }
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        ExtractionError::SchemaMismatch(msg.into())
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(e: serde_json::Error) -> Self {
        ExtractionError::Decode(e.to_string())
    }
}

pub type ExtractResult = Result<ResultTable, ExtractionError>;

/// Read-only state shared by every extractor in one run.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub annotations: &'a AnnotationLookup,
    pub names: &'a NameList,
}

/// How a dataset turns its decoded record into a table.
#[derive(Clone, Copy)]
pub enum Extractor {
    /// Needs nothing but the record.
    Record(fn(&Value) -> ExtractResult),
    /// Joins media items against the per-image annotation lookup.
    Annotated(fn(&Value, &AnnotationLookup) -> ExtractResult),
    /// Compares free-text names against the first-name list.
    Named(fn(&Value, &NameList) -> ExtractResult),
    /// Number of entries in a list: under `list_key`, or the record itself when `None`.
    Count {
        list_key: Option<&'static str>,
        column: &'static str,
    },
}

impl Extractor {
    pub fn needs_annotations(&self) -> bool {
        matches!(self, Extractor::Annotated(_))
    }

    pub fn extract(&self, record: &Value, ctx: &ExtractContext<'_>) -> ExtractResult {
        match *self {
            Extractor::Record(f) => f(record),
            Extractor::Annotated(f) => f(record, ctx.annotations),
            Extractor::Named(f) => f(record, ctx.names),
            Extractor::Count { list_key, column } => {
                relationships::count_entries(record, list_key, column)
            }
        }
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extractor::Record(_) => f.write_str("Record"),
            Extractor::Annotated(_) => f.write_str("Annotated"),
            Extractor::Named(_) => f.write_str("Named"),
            Extractor::Count { list_key, column } => f
                .debug_struct("Count")
                .field("list_key", list_key)
                .field("column", column)
                .finish(),
        }
    }
}

/// Normalize the timestamp of every item to a date string.
pub(crate) fn item_dates<'a, I, F>(items: I, mode: TimestampMode, timestamp_of: F) -> Result<Vec<String>, ExtractionError>
where
    I: IntoIterator<Item = &'a Value>,
    F: Fn(&'a Value) -> Result<&'a Value, ExtractionError>,
{
    items
        .into_iter()
        .map(|item| timestamp::normalize_date(timestamp_of(item)?, mode))
        .collect()
}
