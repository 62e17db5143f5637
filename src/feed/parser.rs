//! Parse a day's archive body into [`Item`]s.
//!
//! The archive is a JSON array of loosely typed objects. Numbers may arrive
//! as JSON numbers or as digit strings, so fields are read from a
//! `serde_json::Value` rather than a fixed struct.

use crate::model::{comment_url_for, dedupe, Item};
use crate::util::sanitize_line;
use chrono::DateTime;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of stories, found {0}")]
    NotAnArray(&'static str),
    #[error("Invalid selector '{0}'")]
    Selector(&'static str),
}

/// Stories parsed from one body plus how many entries were dropped.
#[derive(Debug)]
pub struct ParseResult {
    pub items: Vec<Item>,
    /// Entries that were not objects or had no title.
    pub skipped: usize,
}

pub fn parse_day(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(entries) = value else {
        return Err(ParseError::NotAnArray(kind_name(&value)));
    };

    let total = entries.len();
    let parsed: Vec<Item> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(parse_story)
        .collect();
    let skipped = total - parsed.len();

    Ok(ParseResult {
        items: dedupe(parsed),
        skipped,
    })
}

fn parse_story(obj: &Map<String, Value>) -> Option<Item> {
    let title = text_field(obj, &["link_text", "title"])?;
    let title = sanitize_line(&title);
    if title.is_empty() {
        return None;
    }

    let id = text_field(obj, &["id"]).unwrap_or_default();
    let comment_url = text_field(obj, &["comment_url"])
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| comment_url_for(&id));
    let url = text_field(obj, &["link", "url"])
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| comment_url.clone());

    let submitted = int_field(obj, &["time", "date", "submitted_at"]);
    let submitted_at = i64::try_from(submitted)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default();

    let mut item = Item::new(
        id,
        title.into_owned(),
        url,
        saturate(int_field(obj, &["points"])),
        saturate(int_field(obj, &["comments"])),
        submitted_at,
    )
    .with_comment_url(comment_url);

    if let Some(flag) = obj.get("homepage").and_then(bool_value) {
        item = item.with_homepage(flag);
    }
    Some(item)
}

/// First present string-ish field among `keys`. Numbers are rendered as text.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First present non-negative integer among `keys`; anything unusable is 0.
fn int_field(obj: &Map<String, Value>, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .map_or(0, |v| match v {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => {
                let s = s.trim();
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    s.parse().unwrap_or(u64::MAX)
                } else {
                    0
                }
            }
            _ => 0,
        })
}

fn bool_value(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn saturate(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_typical_entry() {
        let body = br#"[{
            "id": "39000001",
            "link_text": "Show HN: A thing",
            "link": "https://example.com/thing",
            "points": 120,
            "comments": "34",
            "time": 1700000000,
            "homepage": true
        }]"#;

        let out = parse_day(body).unwrap();
        assert_eq!(out.skipped, 0);
        let item = &out.items[0];
        assert_eq!(item.id, "39000001");
        assert_eq!(item.title, "Show HN: A thing");
        assert_eq!(item.url, "https://example.com/thing");
        assert_eq!(item.points, 120);
        assert_eq!(item.comments, 34);
        assert_eq!(item.submitted_at, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(item.comment_url, "https://news.ycombinator.com/item?id=39000001");
        assert_eq!(item.homepage, Some(true));
    }

    #[test]
    fn numeric_id_and_string_time() {
        let body = br#"[{"id": 7, "link_text": "T", "link": "https://a", "date": "1700000100"}]"#;
        let item = &parse_day(body).unwrap().items[0];
        assert_eq!(item.id, "7");
        assert_eq!(item.submitted_at.timestamp(), 1_700_000_100);
        assert_eq!(item.homepage, None);
    }

    #[test]
    fn unusable_numbers_become_zero() {
        let body = br#"[{"link_text": "T", "link": "https://a",
            "points": "n/a", "comments": -3, "time": null}]"#;
        let item = &parse_day(body).unwrap().items[0];
        assert_eq!(item.points, 0);
        assert_eq!(item.comments, 0);
        assert_eq!(item.submitted_at.timestamp(), 0);
    }

    #[test]
    fn untitled_and_non_object_entries_are_skipped() {
        let body = br#"[
            {"link_text": "", "link": "https://a"},
            {"link": "https://b"},
            42,
            {"link_text": "Kept", "link": "https://c"}
        ]"#;
        let out = parse_day(body).unwrap();
        assert_eq!(out.skipped, 3);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].title, "Kept");
    }

    #[test]
    fn missing_link_falls_back_to_comments() {
        let body = br#"[{"id": "99", "link_text": "Ask HN: anything?", "link": ""}]"#;
        let item = &parse_day(body).unwrap().items[0];
        assert_eq!(item.url, "https://news.ycombinator.com/item?id=99");
        assert_eq!(item.url, item.comment_url);
    }

    #[test]
    fn titles_are_sanitized() {
        let body = b"[{\"link_text\": \"Evil\\u001b[2J title\\n\", \"link\": \"https://a\"}]";
        let item = &parse_day(body).unwrap().items[0];
        assert_eq!(item.title, "Evil title");
    }

    #[test]
    fn duplicates_are_dropped() {
        let body = br#"[
            {"link_text": "First", "link": "https://a", "time": 10},
            {"link_text": "Again", "link": "https://a", "time": 10}
        ]"#;
        let out = parse_day(body).unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].title, "First");
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_day(br#"{"stories": []}"#),
            Err(ParseError::NotAnArray("an object"))
        ));
        assert!(matches!(parse_day(b"<html>"), Err(ParseError::Json(_))));
    }

    #[test]
    fn empty_array_is_ok() {
        let out = parse_day(b"[]").unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.skipped, 0);
    }
}
