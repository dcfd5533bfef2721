//! Typed video records and their projection out of decoded feed batches.

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TikharError};
use crate::scan::TIME_FORMAT;

/// Author of a video, nested under each record in JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub signature: String,
    pub is_verified: bool,
    pub follower_count: i64,
    pub video_count: i64,
}

/// One extracted video. Field order here is the JSON output order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub desc: String,
    pub tags: Vec<String>,
    pub time: String,
    pub duration: i64,
    pub author: Author,
    pub sound_name: String,
    pub digg_count: i64,
    pub comment_count: i64,
    pub play_count: i64,
    pub sticker_text: Vec<String>,
    pub url: String,
}

/// Project every video out of the retained feed batches, in order.
///
/// Wrappers without an `item` key are ads or other non-video feed
/// content and are skipped. A batch missing its `data` list, or an item
/// missing any required field, aborts the run.
pub fn extract_records(batches: &[Value]) -> Result<Vec<VideoRecord>> {
    let mut records = Vec::new();
    for batch in batches {
        let data = batch
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| TikharError::MissingField("data".to_string()))?;
        for wrapper in data {
            let Some(item) = wrapper.get("item") else {
                continue;
            };
            records.push(extract_record(item)?);
        }
    }
    Ok(records)
}

fn extract_record(item: &Value) -> Result<VideoRecord> {
    let author = obj_field(item, "author", "item")?;
    let author_stats = obj_field(item, "authorStats", "item")?;
    let stats = obj_field(item, "stats", "item")?;
    let video = obj_field(item, "video", "item")?;
    let music = obj_field(item, "music", "item")?;

    let id = str_field(item, "id", "item")?;
    let desc = str_field(item, "desc", "item")?;
    let author_id = str_field(author, "uniqueId", "item.author")?;

    Ok(VideoRecord {
        tags: extract_tags(&desc),
        time: format_create_time(i64_field(item, "createTime", "item")?)?,
        duration: i64_field(video, "duration", "item.video")?,
        author: Author {
            id: author_id.clone(),
            name: str_field(author, "nickname", "item.author")?,
            signature: str_field(author, "signature", "item.author")?,
            is_verified: bool_field(author, "verified", "item.author")?,
            follower_count: i64_field(author_stats, "followerCount", "item.authorStats")?,
            video_count: i64_field(author_stats, "videoCount", "item.authorStats")?,
        },
        sound_name: str_field(music, "title", "item.music")?,
        digg_count: i64_field(stats, "diggCount", "item.stats")?,
        comment_count: i64_field(stats, "commentCount", "item.stats")?,
        play_count: i64_field(stats, "playCount", "item.stats")?,
        sticker_text: collect_sticker_text(item),
        url: video_url(&author_id, &id),
        id,
        desc,
    })
}

/// `#`-prefixed tokens of a description, prefix stripped. Purely
/// syntactic; no normalization.
pub fn extract_tags(desc: &str) -> Vec<String> {
    desc.split_whitespace()
        .filter_map(|token| token.strip_prefix('#'))
        .map(str::to_string)
        .collect()
}

/// Canonical browse URL for a video.
pub fn video_url(author_id: &str, video_id: &str) -> String {
    format!("www.tiktok.com/@{author_id}/video/{video_id}")
}

// Overlay stickers and their text lines are both optional.
fn collect_sticker_text(item: &Value) -> Vec<String> {
    let mut texts = Vec::new();
    let Some(stickers) = item.get("stickersOnItem").and_then(Value::as_array) else {
        return texts;
    };
    for sticker in stickers {
        let Some(lines) = sticker.get("stickerText").and_then(Value::as_array) else {
            continue;
        };
        texts.extend(lines.iter().filter_map(Value::as_str).map(str::to_string));
    }
    texts
}

fn format_create_time(secs: i64) -> Result<String> {
    let time = Local
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TikharError::InvalidField(format!("item.createTime out of range: {secs}")))?;
    Ok(time.format(TIME_FORMAT).to_string())
}

fn obj_field<'a>(value: &'a Value, key: &str, context: &str) -> Result<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| TikharError::MissingField(format!("{context}.{key}")))
}

fn str_field(value: &Value, key: &str, context: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TikharError::MissingField(format!("{context}.{key}")))
}

fn i64_field(value: &Value, key: &str, context: &str) -> Result<i64> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| TikharError::MissingField(format!("{context}.{key}")))
}

fn bool_field(value: &Value, key: &str, context: &str) -> Result<bool> {
    value
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| TikharError::MissingField(format!("{context}.{key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> Value {
        json!({
            "id": "7201234567890123456",
            "desc": "spring break #travel #beach vibes",
            "createTime": 1676301000,
            "video": { "duration": 15 },
            "author": {
                "uniqueId": "wanderer",
                "nickname": "The Wanderer",
                "signature": "travel diaries",
                "verified": true
            },
            "authorStats": { "followerCount": 125000, "videoCount": 342 },
            "music": { "title": "original sound - wanderer" },
            "stats": { "diggCount": 4521, "commentCount": 89, "playCount": 103442 },
            "stickersOnItem": [
                { "stickerText": ["day one", "day two"] },
                { "stickerText": ["part 1", "part 2"] }
            ]
        })
    }

    #[test]
    fn tags_keep_hash_prefixed_tokens_only() {
        assert_eq!(extract_tags("hello #world #foo bar"), vec!["world", "foo"]);
        assert!(extract_tags("no tags at all").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn url_synthesis_uses_fixed_template() {
        assert_eq!(video_url("abc", "123"), "www.tiktok.com/@abc/video/123");
    }

    #[test]
    fn sticker_text_flattens_overlays_in_order() {
        let record = extract_record(&sample_item()).unwrap();
        assert_eq!(
            record.sticker_text,
            vec!["day one", "day two", "part 1", "part 2"]
        );
    }

    #[test]
    fn projects_full_field_set() {
        let record = extract_record(&sample_item()).unwrap();
        assert_eq!(record.id, "7201234567890123456");
        assert_eq!(record.desc, "spring break #travel #beach vibes");
        assert_eq!(record.tags, vec!["travel", "beach"]);
        assert_eq!(record.duration, 15);
        assert_eq!(record.author.id, "wanderer");
        assert_eq!(record.author.name, "The Wanderer");
        assert_eq!(record.author.signature, "travel diaries");
        assert!(record.author.is_verified);
        assert_eq!(record.author.follower_count, 125000);
        assert_eq!(record.author.video_count, 342);
        assert_eq!(record.sound_name, "original sound - wanderer");
        assert_eq!(record.digg_count, 4521);
        assert_eq!(record.comment_count, 89);
        assert_eq!(record.play_count, 103442);
        assert_eq!(
            record.url,
            "www.tiktok.com/@wanderer/video/7201234567890123456"
        );
        // Local-time rendering; assert shape rather than the instant.
        assert_eq!(record.time.len(), 19);
        assert_eq!(&record.time[..2], "20");
        assert_eq!(record.time.as_bytes()[10], b'T');
    }

    #[test]
    fn missing_stickers_yield_empty_list() {
        let mut item = sample_item();
        item.as_object_mut().unwrap().remove("stickersOnItem");
        let record = extract_record(&item).unwrap();
        assert!(record.sticker_text.is_empty());
    }

    #[test]
    fn wrappers_without_item_are_skipped() {
        let batches = vec![json!({
            "status_code": 203,
            "data": [
                { "adInfo": { "campaign": "x" } },
                { "item": sample_item() }
            ]
        })];
        let records = extract_records(&batches).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_required_field_is_fatal() {
        let mut item = sample_item();
        item.as_object_mut().unwrap().remove("stats");
        let batches = vec![json!({ "status_code": 203, "data": [{ "item": item }] })];
        let err = extract_records(&batches).unwrap_err();
        assert!(err.to_string().contains("item.stats"));
    }

    #[test]
    fn batch_without_data_list_is_fatal() {
        let batches = vec![json!({ "status_code": 203 })];
        assert!(extract_records(&batches).is_err());
    }
}
