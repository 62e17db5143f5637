//! Item model: one ranked story from a day's archive.
//!
//! Items are immutable once parsed. A day's list is shared as `Arc<[Item]>`
//! between the cache entry and any display rows borrowed from it.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Base URL for Hacker News discussion pages.
pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

/// Build the comments URL for an upstream story id.
pub fn comment_url_for(id: &str) -> String {
    format!("{}{}", HN_ITEM_URL, id)
}

/// A single story as published in the daily archive.
///
/// Rank is not stored: it is the item's 1-based position in its day list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Upstream story id (used to build `comment_url` when the source omits it).
    pub id: String,
    pub title: String,
    pub url: String,
    pub points: u32,
    pub comments: u32,
    pub comment_url: String,
    pub submitted_at: DateTime<Utc>,
    /// Whether the source marked the story as having reached the homepage.
    /// `None` when the source carries no such flag.
    pub homepage: Option<bool>,
}

impl Item {
    /// Construct an item with a comments URL derived from `id` and no homepage flag.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        points: u32,
        comments: u32,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let comment_url = comment_url_for(&id);
        Self {
            id,
            title: title.into(),
            url: url.into(),
            points,
            comments,
            comment_url,
            submitted_at,
            homepage: None,
        }
    }

    pub fn with_homepage(mut self, homepage: bool) -> Self {
        self.homepage = Some(homepage);
        self
    }

    pub fn with_comment_url(mut self, comment_url: impl Into<String>) -> Self {
        self.comment_url = comment_url.into();
        self
    }

    /// De-duplication key: `(url, submitted_at)`.
    pub fn identity(&self) -> (&str, DateTime<Utc>) {
        (self.url.as_str(), self.submitted_at)
    }
}

/// Drop repeated items, keeping the first occurrence of each identity.
///
/// Survivors keep their relative order, so rank follows the first occurrence.
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::with_capacity(items.len());
    let before = items.len();

    let kept: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let (url, submitted_at) = item.identity();
            seen.insert((url.to_owned(), submitted_at))
        })
        .collect();

    if kept.len() < before {
        tracing::debug!(
            dropped = before - kept.len(),
            kept = kept.len(),
            "Dropped duplicate items"
        );
    }
    kept
}
