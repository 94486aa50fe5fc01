// src/extract/media.rs
//! Posts and stories: one row per media item, joined with the image annotations.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::json::{items, list_field};
use super::timestamp::{normalize_date, TimestampMode};
use super::{ExtractResult, ExtractionError};
use crate::annotations::AnnotationLookup;
use crate::table::ResultTable;

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    media: Vec<MediaItem>,
    #[serde(default)]
    creation_timestamp: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    uri: String,
    #[serde(default)]
    creation_timestamp: Option<Value>,
    #[serde(default)]
    media_metadata: Option<MediaMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaMetadata {
    #[serde(default)]
    photo_metadata: Option<ExifHolder>,
    #[serde(default)]
    video_metadata: Option<ExifHolder>,
}

#[derive(Debug, Default, Deserialize)]
struct ExifHolder {
    #[serde(default)]
    exif_data: Vec<Map<String, Value>>,
}

impl MediaItem {
    fn has_geolocation(&self) -> bool {
        let Some(meta) = &self.media_metadata else {
            return false;
        };
        [&meta.photo_metadata, &meta.video_metadata]
            .into_iter()
            .flatten()
            .flat_map(|holder| holder.exif_data.iter())
            .any(|exif| exif.contains_key("latitude") || exif.contains_key("longitude"))
    }
}

const MEDIA_COLUMNS: [&str; 5] = ["date", "uri", "faces_detected", "has_faces", "has_geolocation"];

fn push_media_row(
    table: &mut ResultTable,
    item: &MediaItem,
    fallback_ts: Option<&Value>,
    annotations: &AnnotationLookup,
) -> Result<(), ExtractionError> {
    let ts = item
        .creation_timestamp
        .as_ref()
        .or(fallback_ts)
        .unwrap_or(&Value::Null);
    let date = normalize_date(ts, TimestampMode::Lenient)?;
    let faces = annotations.feature_count(&item.uri);
    table.push_row(vec![
        date.into(),
        item.uri.clone().into(),
        faces.into(),
        (faces > 0).into(),
        item.has_geolocation().into(),
    ]);
    Ok(())
}

/// Feed posts. The file is a list of posts, or a single bare post; a post holds
/// one or more media items (carousels), each with its own row.
pub fn extract_posts(record: &Value, annotations: &AnnotationLookup) -> ExtractResult {
    let mut table = ResultTable::new(MEDIA_COLUMNS);
    for raw in items(record)? {
        let post: Post = serde_json::from_value(raw.clone())?;
        for item in &post.media {
            push_media_row(&mut table, item, post.creation_timestamp.as_ref(), annotations)?;
        }
    }
    Ok(table)
}

pub fn extract_stories(record: &Value, annotations: &AnnotationLookup) -> ExtractResult {
    let mut table = ResultTable::new(MEDIA_COLUMNS);
    for raw in list_field(record, "ig_stories")? {
        let item: MediaItem = serde_json::from_value(raw.clone())?;
        push_media_row(&mut table, &item, None, annotations)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SENTINEL_DATE;
    use crate::table::Cell;
    use serde_json::json;

    fn lookup() -> AnnotationLookup {
        [
            ("export/media/posts/202311/a.jpg".to_string(), 2),
            ("export/media/posts/202311/b.jpg".to_string(), 0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn carousel_post_yields_row_per_item() {
        let record = json!([{
            "title": "",
            "creation_timestamp": 1700000000,
            "media": [
                {"uri": "media/posts/202311/a.jpg", "creation_timestamp": 1700000000,
                 "media_metadata": {"photo_metadata": {"exif_data": [{"latitude": 52.1, "longitude": 5.1}]}}},
                {"uri": "media/posts/202311/b.jpg",
                 "media_metadata": {"photo_metadata": {"exif_data": [{"scene_type": 1}]}}}
            ]
        }]);
        let t = extract_posts(&record, &lookup()).expect("table");
        assert_eq!(t.columns, MEDIA_COLUMNS.to_vec());
        assert_eq!(
            t.rows,
            vec![
                vec![
                    Cell::Text("2023-11-14".into()),
                    Cell::Text("media/posts/202311/a.jpg".into()),
                    Cell::Int(2),
                    Cell::Bool(true),
                    Cell::Bool(true),
                ],
                vec![
                    Cell::Text("2023-11-14".into()),
                    Cell::Text("media/posts/202311/b.jpg".into()),
                    Cell::Int(0),
                    Cell::Bool(false),
                    Cell::Bool(false),
                ],
            ]
        );
    }

    #[test]
    fn single_post_object_matches_list() {
        let post = json!({"media": [{"uri": "media/posts/202311/a.jpg", "creation_timestamp": 1700000000}]});
        let bare = extract_posts(&post, &lookup()).expect("table");
        let wrapped = extract_posts(&json!([post]), &lookup()).expect("table");
        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn unannotated_story_has_no_faces() {
        let record = json!({"ig_stories": [
            {"uri": "media/stories/202311/s.mp4", "creation_timestamp": "garbled",
             "media_metadata": {"video_metadata": {"exif_data": [{"longitude": 4.9}]}}}
        ]});
        let t = extract_stories(&record, &AnnotationLookup::new()).expect("table");
        assert_eq!(
            t.rows,
            vec![vec![
                Cell::Text(SENTINEL_DATE.into()),
                Cell::Text("media/stories/202311/s.mp4".into()),
                Cell::Int(0),
                Cell::Bool(false),
                Cell::Bool(true),
            ]]
        );
    }

    #[test]
    fn media_item_without_uri_is_a_decode_error() {
        let record = json!({"ig_stories": [{"creation_timestamp": 1700000000}]});
        assert!(matches!(
            extract_stories(&record, &lookup()),
            Err(ExtractionError::Decode(_))
        ));
    }
}
