// src/extract/timestamp.rs

use chrono::{DateTime, Datelike, FixedOffset};
use serde_json::Value;
use tracing::warn;

use super::ExtractionError;

/// All dates are reported in UTC+1, whatever the export's own zone.
pub const UTC_OFFSET_HOURS: i32 = 1;

/// Stands in for a timestamp that cannot be converted when the caller tolerates it.
pub const SENTINEL_DATE: &str = "1999-01-01";

/// What to do with an unconvertible timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampMode {
    /// Fail the record with [`ExtractionError::Timestamp`].
    Strict,
    /// Substitute [`SENTINEL_DATE`] and carry on.
    Lenient,
}

/// Epoch seconds from an integer, a float (truncated) or a numeric string.
fn epoch_seconds(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// `"YYYY-MM-DD"` for an epoch timestamp, read in UTC+1.
pub fn epoch_to_date(raw: &Value) -> Result<String, ExtractionError> {
    let offset = FixedOffset::east_opt(UTC_OFFSET_HOURS * 3600)
        .ok_or_else(|| ExtractionError::Other("invalid UTC offset".into()))?;

    let local = epoch_seconds(raw)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.with_timezone(&offset))
        // four-digit years only
        .filter(|dt| (1..=9999).contains(&dt.year()));

    match local {
        Some(dt) => Ok(dt.format("%Y-%m-%d").to_string()),
        None => {
            warn!(timestamp = %raw, "could not convert epoch timestamp");
            Err(ExtractionError::Timestamp(raw.to_string()))
        }
    }
}

/// [`epoch_to_date`] under the given failure mode.
pub fn normalize_date(raw: &Value, mode: TimestampMode) -> Result<String, ExtractionError> {
    match (epoch_to_date(raw), mode) {
        (Ok(date), _) => Ok(date),
        (Err(_), TimestampMode::Lenient) => Ok(SENTINEL_DATE.to_string()),
        (Err(e), TimestampMode::Strict) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_zero_is_first_of_january() {
        assert_eq!(epoch_to_date(&json!(0)).ok().as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn offset_moves_late_evening_to_next_day() {
        // 2023-11-14 23:30:00 UTC is 00:30 on the 15th in UTC+1
        assert_eq!(
            epoch_to_date(&json!(1700004600)).ok().as_deref(),
            Some("2023-11-15")
        );
        assert_eq!(
            epoch_to_date(&json!(1700000000)).ok().as_deref(),
            Some("2023-11-14")
        );
    }

    #[test]
    fn accepts_strings_and_floats() {
        assert_eq!(epoch_to_date(&json!("1700000000")).ok().as_deref(), Some("2023-11-14"));
        assert_eq!(epoch_to_date(&json!(" 1700000000 ")).ok().as_deref(), Some("2023-11-14"));
        assert_eq!(epoch_to_date(&json!(1700000000.75)).ok().as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        for raw in [json!("yesterday"), json!(null), json!(true), json!(i64::MAX), json!(u64::MAX)] {
            assert!(
                matches!(epoch_to_date(&raw), Err(ExtractionError::Timestamp(_))),
                "{} should not convert",
                raw
            );
        }
    }

    #[test]
    fn lenient_mode_substitutes_sentinel() {
        assert_eq!(
            normalize_date(&json!("not a number"), TimestampMode::Lenient).ok().as_deref(),
            Some(SENTINEL_DATE)
        );
        assert!(normalize_date(&json!("not a number"), TimestampMode::Strict).is_err());
        assert_eq!(
            normalize_date(&json!(0), TimestampMode::Strict).ok().as_deref(),
            Some("1970-01-01")
        );
    }
}
