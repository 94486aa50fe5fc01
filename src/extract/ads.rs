// src/extract/ads.rs
//! Ads, impressions and topics.

use serde_json::Value;

use super::aggregate::{daily_counts, daily_lists};
use super::json::{field, keys, list_field, list_timestamp, map_entry, map_timestamp, probe, text};
use super::timestamp::{normalize_date, TimestampMode};
use super::{item_dates, ExtractResult, ExtractionError};
use crate::table::ResultTable;

/// Reported for ad impressions exported before the author field existed.
pub const MISSING_AUTHOR: &str = "unknown";

/// Product names clicked, listed per day.
pub fn extract_ads_clicked(record: &Value) -> ExtractResult {
    let pairs = list_field(record, "impressions_history_ads_clicked")?
        .into_iter()
        .map(|item| {
            let date = normalize_date(list_timestamp(item)?, TimestampMode::Strict)?;
            Ok((date, text(field(item, "title")?)?))
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;
    Ok(daily_lists(pairs, "ads_clicked"))
}

/// Authors of ads seen, listed per day.
pub fn extract_ads_viewed(record: &Value) -> ExtractResult {
    let pairs = list_field(record, "impressions_history_ads_seen")?
        .into_iter()
        .map(|item| {
            let date = normalize_date(map_timestamp(item)?, TimestampMode::Strict)?;
            let author = match probe(field(item, "string_map_data")?, keys::AUTHOR) {
                Some(entry) => text(field(entry, "value")?)?,
                None => MISSING_AUTHOR.to_string(),
            };
            Ok((date, author))
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;
    Ok(daily_lists(pairs, "authors_seen"))
}

pub fn extract_posts_viewed(record: &Value) -> ExtractResult {
    let items = list_field(record, "impressions_history_posts_seen")?;
    let dates = item_dates(items, TimestampMode::Strict, map_timestamp)?;
    Ok(daily_counts(dates, "postsViewed_count"))
}

pub fn extract_videos_watched(record: &Value) -> ExtractResult {
    let items = list_field(record, "impressions_history_videos_watched")?;
    let dates = item_dates(items, TimestampMode::Strict, map_timestamp)?;
    Ok(daily_counts(dates, "videosViewed_count"))
}

/// The file only exists for accounts that took the ad-free subscription.
pub fn extract_subscription_for_no_ads(_record: &Value) -> ExtractResult {
    Ok(ResultTable::scalar("adfree_subscription", true))
}

/// One row per topic the vendor inferred.
pub fn extract_your_topics(record: &Value) -> ExtractResult {
    let mut table = ResultTable::new(["your_topics"]);
    for item in list_field(record, "topics_your_topics")? {
        let name = text(field(map_entry(item, keys::NAME)?, "value")?)?;
        table.push_row(vec![name.into()]);
    }
    Ok(table)
}
