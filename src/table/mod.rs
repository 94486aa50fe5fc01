// src/table/mod.rs
pub mod arrow;

pub use self::arrow::to_record_batch;

use serde::Serialize;

/// One value in a result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<Vec<String>> for Cell {
    fn from(v: Vec<String>) -> Self {
        Cell::List(v)
    }
}

/// Rows produced by a single extractor. Never mutated once handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// A one-column, one-row table holding a single scalar fact.
    pub fn scalar(column: &str, value: impl Into<Cell>) -> Self {
        let mut table = Self::new([column]);
        table.rows.push(vec![value.into()]);
        table
    }

    /// Stand-in for a dataset that could not be extracted.
    pub fn marker(dataset: &str, reason: &str) -> Self {
        Self::scalar(dataset, reason)
    }

    /// Appends a row. Rows must be as wide as the header.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_record_batch(&self) -> anyhow::Result<::arrow::record_batch::RecordBatch> {
        to_record_batch(self)
    }

    /// Row-oriented view, one JSON object per row, as the consent layer reads it.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|c| serde_json::to_value(c).unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}
