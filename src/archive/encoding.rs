// src/archive/encoding.rs

use serde_json::{Map, Value};

/// Undo the vendor's byte-per-code-point escaping of UTF-8 text.
///
/// The raw JSON `"Ge\u00c3\u00a4ndert"` decodes to `"GeÃ¤ndert"`; its chars are all `<= U+00FF`,
/// so reinterpreting them as bytes gives back `"Geändert"`. Strings that already
/// hold real non-Latin-1 text, or whose bytes are not valid UTF-8, are returned as-is.
pub fn repair_text(s: &str) -> String {
    if s.is_ascii() || s.chars().any(|c| u32::from(c) > 0xFF) {
        return s.to_string();
    }
    let bytes: Vec<u8> = s.chars().map(|c| u32::from(c) as u8).collect();
    match String::from_utf8(bytes) {
        Ok(fixed) => fixed,
        Err(_) => s.to_string(),
    }
}

/// Apply [`repair_text`] to every key and string in a decoded record.
pub fn repair_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(repair_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(repair_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (repair_text(&k), repair_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
