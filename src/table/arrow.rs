// src/table/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, BooleanArray, Int64Array, ListBuilder, StringArray, StringBuilder},
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::{Cell, ResultTable};

/// Physical layout chosen for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Text,
    List,
}

fn kind_of(cell: &Cell) -> ColumnKind {
    match cell {
        Cell::Bool(_) => ColumnKind::Bool,
        Cell::Int(_) => ColumnKind::Int,
        Cell::Text(_) => ColumnKind::Text,
        Cell::List(_) => ColumnKind::List,
    }
}

/// Columns with a single cell kind keep it; mixed or empty columns fall back to text.
fn column_kind(table: &ResultTable, idx: usize) -> ColumnKind {
    let mut kinds = table.rows.iter().filter_map(|r| r.get(idx)).map(kind_of);
    match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first,
        _ => ColumnKind::Text,
    }
}

fn cell_to_text(cell: Option<&Cell>) -> Option<String> {
    match cell? {
        Cell::Bool(b) => Some(b.to_string()),
        Cell::Int(i) => Some(i.to_string()),
        Cell::Text(s) => Some(s.clone()),
        Cell::List(items) => serde_json::to_string(items).ok(),
    }
}

fn build_column(table: &ResultTable, idx: usize) -> ArrayRef {
    let cells = table.rows.iter().map(|r| r.get(idx));
    match column_kind(table, idx) {
        ColumnKind::Bool => Arc::new(
            cells
                .map(|c| match c {
                    Some(Cell::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        ColumnKind::Int => Arc::new(
            cells
                .map(|c| match c {
                    Some(Cell::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        ColumnKind::List => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for cell in cells {
                match cell {
                    Some(Cell::List(items)) => {
                        for item in items {
                            builder.values().append_value(item);
                        }
                        builder.append(true);
                    }
                    _ => builder.append(false),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Text => Arc::new(cells.map(cell_to_text).collect::<StringArray>()),
    }
}

/// Convert a result table into an Arrow batch for Parquet export.
///
/// - Bool → Boolean
/// - Int  → Int64
/// - Text → Utf8
/// - List → List<Utf8>
/// - mixed kinds in one column → Utf8 (lists rendered as JSON)
pub fn to_record_batch(table: &ResultTable) -> Result<RecordBatch> {
    let arrays: Vec<ArrayRef> = (0..table.columns.len())
        .map(|idx| build_column(table, idx))
        .collect();

    let fields: Vec<Field> = table
        .columns
        .iter()
        .zip(&arrays)
        .map(|(name, arr)| Field::new(name, arr.data_type().clone(), true))
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .with_context(|| format!("building record batch for columns {:?}", table.columns))
}
