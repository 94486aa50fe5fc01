// src/extract/aggregate.rs
//! Per-day grouping. Dates are ISO strings, so lexical order is calendar order.

use std::collections::BTreeMap;

use crate::table::{Cell, ResultTable};

/// Number of rows per date.
pub fn count_per_day<I>(dates: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = String>,
{
    let mut out = BTreeMap::new();
    for date in dates {
        *out.entry(date).or_insert(0) += 1;
    }
    out
}

/// Every value seen per date, in first-occurrence order within the date.
pub fn list_per_day<I>(pairs: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (date, value) in pairs {
        out.entry(date).or_default().push(value);
    }
    out
}

/// `date | <column>` with one row per date and the row count.
pub fn daily_counts<I>(dates: I, column: &str) -> ResultTable
where
    I: IntoIterator<Item = String>,
{
    let mut table = ResultTable::new(["date", column]);
    for (date, n) in count_per_day(dates) {
        table.push_row(vec![Cell::Text(date), Cell::Int(n)]);
    }
    table
}

/// `date | <column>` with one row per date and the list of values.
pub fn daily_lists<I>(pairs: I, column: &str) -> ResultTable
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut table = ResultTable::new(["date", column]);
    for (date, values) in list_per_day(pairs) {
        table.push_row(vec![Cell::Text(date), Cell::List(values)]);
    }
    table
}
