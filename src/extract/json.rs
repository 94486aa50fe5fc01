// src/extract/json.rs
//! Guarded probing of decoded records. Every miss is an explicit
//! `SchemaMismatch`, never a panic.

use serde_json::Value;

use super::ExtractionError;

/// Known spellings of vendor keys across export locales, probed in order.
pub mod keys {
    pub const TIME: &[&str] = &["Time", "Zeit", "Tijd"];
    pub const AUTHOR: &[&str] = &["Author", "Autor", "Auteur"];
    pub const NAME: &[&str] = &["Name", "Naam"];
    pub const USERNAME: &[&str] = &["Username", "Benutzername", "Gebruikersnaam"];
    pub const CHANGED: &[&str] = &["Changed", "Geändert", "Gewijzigd"];
    pub const CHANGE_DATE: &[&str] = &["Change Date", "Änderungsdatum", "Wijzigingsdatum"];
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `v[key]`, requiring `v` to be an object that has it.
pub fn field<'a>(v: &'a Value, key: &str) -> Result<&'a Value, ExtractionError> {
    match v {
        Value::Object(map) => map
            .get(key)
            .ok_or_else(|| ExtractionError::mismatch(format!("missing key `{}`", key))),
        other => Err(ExtractionError::mismatch(format!(
            "expected object holding `{}`, found {}",
            key,
            type_name(other)
        ))),
    }
}

/// The first of `spellings` present on `v`, if any.
pub fn probe<'a>(v: &'a Value, spellings: &[&str]) -> Option<&'a Value> {
    let map = v.as_object()?;
    spellings.iter().find_map(|k| map.get(*k))
}

/// Like [`probe`], but absence in every spelling is a schema mismatch.
pub fn field_any<'a>(v: &'a Value, spellings: &[&str]) -> Result<&'a Value, ExtractionError> {
    probe(v, spellings)
        .ok_or_else(|| ExtractionError::mismatch(format!("none of {:?} present", spellings)))
}

/// View a value as a sequence. A bare object stands for a one-element list.
pub fn items(v: &Value) -> Result<Vec<&Value>, ExtractionError> {
    match v {
        Value::Array(list) => Ok(list.iter().collect()),
        Value::Object(_) => Ok(vec![v]),
        other => Err(ExtractionError::mismatch(format!(
            "expected list or object, found {}",
            type_name(other)
        ))),
    }
}

/// `items(v[key])`.
pub fn list_field<'a>(v: &'a Value, key: &str) -> Result<Vec<&'a Value>, ExtractionError> {
    items(field(v, key)?)
}

/// First element of a sequence-like value.
pub fn first(v: &Value) -> Result<&Value, ExtractionError> {
    items(v)?
        .into_iter()
        .next()
        .ok_or_else(|| ExtractionError::mismatch("empty list"))
}

pub fn text(v: &Value) -> Result<String, ExtractionError> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::mismatch(format!("expected string, found {}", type_name(v))))
}

/// `item.string_map_data.<spelling>`: the labelled-field layout most datasets use.
pub fn map_entry<'a>(item: &'a Value, spellings: &[&str]) -> Result<&'a Value, ExtractionError> {
    field_any(field(item, "string_map_data")?, spellings)
}

/// `item.string_map_data.<Time>.timestamp`
pub fn map_timestamp(item: &Value) -> Result<&Value, ExtractionError> {
    field(map_entry(item, keys::TIME)?, "timestamp")
}

/// `item.string_list_data[0].timestamp`
pub fn list_timestamp(item: &Value) -> Result<&Value, ExtractionError> {
    field(first(field(item, "string_list_data")?)?, "timestamp")
}
