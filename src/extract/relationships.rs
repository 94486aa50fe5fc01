// src/extract/relationships.rs
//! Followers, following and the other account lists. Each dataset reduces to a count.

use serde_json::Value;

use super::json::{field, items};
use super::ExtractResult;
use crate::table::ResultTable;

/// Number of entries under `list_key`, or in the record itself when `list_key` is `None`.
pub fn count_entries(record: &Value, list_key: Option<&str>, column: &str) -> ExtractResult {
    let list = match list_key {
        Some(key) => field(record, key)?,
        None => record,
    };
    Ok(ResultTable::scalar(column, items(list)?.len()))
}
