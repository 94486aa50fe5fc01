// src/extract/activity.rs
//! Likes, comments, searches, logins and profile edits.
//! Newer datasets: an unconvertible timestamp lands on the sentinel date instead of failing.

use serde_json::Value;

use super::aggregate::{daily_counts, daily_lists};
use super::json::{field, items, keys, list_field, list_timestamp, map_entry, map_timestamp, text};
use super::timestamp::{normalize_date, TimestampMode};
use super::{item_dates, ExtractResult, ExtractionError};

pub fn extract_liked_posts(record: &Value) -> ExtractResult {
    let entries = list_field(record, "likes_media_likes")?;
    let dates = item_dates(entries, TimestampMode::Lenient, list_timestamp)?;
    Ok(daily_counts(dates, "likes_count"))
}

/// The comments file is a bare list, or a bare object when there is one comment.
pub fn extract_post_comments(record: &Value) -> ExtractResult {
    let dates = item_dates(items(record)?, TimestampMode::Lenient, map_timestamp)?;
    Ok(daily_counts(dates, "comments_count"))
}

pub fn extract_account_searches(record: &Value) -> ExtractResult {
    let entries = list_field(record, "searches_user")?;
    let dates = item_dates(entries, TimestampMode::Lenient, map_timestamp)?;
    Ok(daily_counts(dates, "searches_count"))
}

pub fn extract_login_activity(record: &Value) -> ExtractResult {
    let entries = list_field(record, "account_history_login_history")?;
    let dates = item_dates(entries, TimestampMode::Lenient, map_timestamp)?;
    Ok(daily_counts(dates, "logins_count"))
}

/// Which profile fields were edited, per day.
pub fn extract_profile_changes(record: &Value) -> ExtractResult {
    let pairs = list_field(record, "profile_profile_change")?
        .into_iter()
        .map(|item| {
            let changed = text(field(map_entry(item, keys::CHANGED)?, "value")?)?;
            let when = field(map_entry(item, keys::CHANGE_DATE)?, "timestamp")?;
            Ok((normalize_date(when, TimestampMode::Lenient)?, changed))
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;
    Ok(daily_lists(pairs, "fields_changed"))
}
