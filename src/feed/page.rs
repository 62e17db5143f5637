//! Scrape stories from a hckrnews.com listing page.
//!
//! The front page lists the current day's stories, then an `li.day`
//! separator row, then earlier stories. A dated page (`/YYYYMMDD`) lists a
//! single day. Every story row is an `li.row.entry`:
//!
//! ```text
//! <li class="row entry" id="40000001">
//!   <a class="hn" href="https://news.ycombinator.com/item?id=40000001" data-date="1709251500">
//!     <span class="points homepage">512</span> <span class="comments">88</span>
//!   </a>
//!   <a class="link" href="https://example.com/">Title <span class="source">example.com</span></a>
//! </li>
//! ```
//!
//! `span.points.homepage` marks stories that reached the Hacker News front
//! page. Rows whose `a.hn` carries the `job` class are job ads and are dropped.

use crate::model::{comment_url_for, Item};
use crate::util::sanitize_line;
use chrono::DateTime;
use scraper::{ElementRef, Html, Selector};

use super::parser::ParseError;

/// Stories found on one page, split at the first day separator.
#[derive(Debug, Default)]
pub struct PageStories {
    /// Rows before the first separator (all rows if there is none).
    pub current: Vec<Item>,
    /// Rows after it.
    pub earlier: Vec<Item>,
    /// Job ads and untitled rows.
    pub skipped: usize,
}

impl PageStories {
    /// Every story on the page in listing order.
    pub fn into_all(self) -> Vec<Item> {
        let mut items = self.current;
        items.extend(self.earlier);
        items
    }
}

struct Selectors {
    row: Selector,
    hn: Selector,
    points: Selector,
    comments: Selector,
    link: Selector,
    source: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            row: selector("li.row")?,
            hn: selector("a.hn")?,
            points: selector("span.points")?,
            comments: selector("span.comments")?,
            link: selector("a.link")?,
            source: selector("span.source")?,
        })
    }
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Parse a listing page. A page without any story rows yields empty lists.
pub fn parse_page(html: &str) -> Result<PageStories, ParseError> {
    let sel = Selectors::new()?;
    let document = Html::parse_document(html);

    let mut page = PageStories::default();
    let mut past_separator = false;

    for row in document.select(&sel.row) {
        if has_class(&row, "day") {
            past_separator = true;
            continue;
        }
        if !has_class(&row, "entry") {
            continue;
        }

        match parse_entry(&row, &sel) {
            Some(item) if past_separator => page.earlier.push(item),
            Some(item) => page.current.push(item),
            None => page.skipped += 1,
        }
    }

    Ok(page)
}

fn parse_entry(row: &ElementRef<'_>, sel: &Selectors) -> Option<Item> {
    let hn = row.select(&sel.hn).next();
    if hn.as_ref().is_some_and(|a| has_class(a, "job")) {
        return None;
    }

    let link = row.select(&sel.link).next()?;
    let mut title: String = link.text().collect();
    if let Some(source) = link.select(&sel.source).next() {
        let source_text: String = source.text().collect();
        title = title.replace(&source_text, "");
    }
    let title = sanitize_line(title.trim()).into_owned();
    if title.is_empty() {
        return None;
    }

    let id = row.value().attr("id").unwrap_or_default().trim().to_string();
    let comment_url = hn
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.starts_with("http"))
        .map_or_else(|| comment_url_for(&id), str::to_string);
    let url = link
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map_or_else(|| comment_url.clone(), str::to_string);

    let points_el = row.select(&sel.points).next();
    let points = points_el.map_or(0, |el| count(&el));
    let comments = row.select(&sel.comments).next().map_or(0, |el| count(&el));
    let homepage = points_el.is_some_and(|el| has_class(&el, "homepage"));

    let submitted_at = hn
        .and_then(|a| a.value().attr("data-date"))
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default();

    Some(
        Item::new(id, title, url, points, comments, submitted_at)
            .with_comment_url(comment_url)
            .with_homepage(homepage),
    )
}

/// Digits-only element text as a count; anything else is 0.
fn count(el: &ElementRef<'_>) -> u32 {
    let text: String = el.text().collect();
    let text = text.trim();
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().unwrap_or(u32::MAX)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: u32, title: &str, points: &str, homepage: bool, time: i64) -> String {
        let class = if homepage { "points homepage" } else { "points" };
        format!(
            r#"<li class="row entry" id="{id}">
                <a class="hn" href="https://news.ycombinator.com/item?id={id}" data-date="{time}">
                    <span class="{class}">{points}</span> <span class="comments">12</span>
                </a>
                <a class="link" href="https://example.com/{id}">{title} <span class="source">example.com</span></a>
            </li>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!("<html><body><ul>{}</ul></body></html>", rows.concat())
    }

    #[test]
    fn parses_entry_fields() {
        let html = page(&[entry(41, "Show HN: Widget", "230", true, 1_709_251_500)]);
        let out = parse_page(&html).unwrap();
        assert_eq!(out.skipped, 0);
        assert!(out.earlier.is_empty());

        let item = &out.current[0];
        assert_eq!(item.id, "41");
        assert_eq!(item.title, "Show HN: Widget");
        assert_eq!(item.url, "https://example.com/41");
        assert_eq!(item.comment_url, "https://news.ycombinator.com/item?id=41");
        assert_eq!(item.points, 230);
        assert_eq!(item.comments, 12);
        assert_eq!(item.submitted_at.timestamp(), 1_709_251_500);
        assert_eq!(item.homepage, Some(true));
    }

    #[test]
    fn rows_after_separator_are_earlier() {
        let html = page(&[
            entry(1, "Today one", "10", false, 200),
            entry(2, "Today two", "20", true, 300),
            r#"<li class="row day">Yesterday</li>"#.to_string(),
            entry(3, "Yesterday one", "30", false, 100),
        ]);
        let out = parse_page(&html).unwrap();
        let titles = |items: &[Item]| items.iter().map(|i| i.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&out.current), vec!["Today one", "Today two"]);
        assert_eq!(titles(&out.earlier), vec!["Yesterday one"]);
        assert_eq!(out.current[0].homepage, Some(false));
        assert_eq!(out.into_all().len(), 3);
    }

    #[test]
    fn job_ads_and_untitled_rows_are_skipped() {
        let job = r#"<li class="row entry" id="9">
            <a class="hn job" href="https://news.ycombinator.com/item?id=9" data-date="1"></a>
            <a class="link" href="https://jobs.example.com">Acme is hiring</a>
        </li>"#;
        let untitled = r#"<li class="row entry" id="8">
            <a class="link" href="https://example.com"><span class="source">example.com</span></a>
        </li>"#;
        let html = page(&[job.to_string(), untitled.to_string(), entry(7, "Kept", "1", false, 1)]);
        let out = parse_page(&html).unwrap();
        assert_eq!(out.skipped, 2);
        assert_eq!(out.current.len(), 1);
        assert_eq!(out.current[0].title, "Kept");
    }

    #[test]
    fn missing_counts_and_links_fall_back() {
        let bare = r#"<li class="row entry" id="5">
            <a class="hn" data-date="oops"><span class="points">?</span></a>
            <a class="link" href="">Ask HN: Anything</a>
        </li>"#;
        let out = parse_page(&page(&[bare.to_string()])).unwrap();
        let item = &out.current[0];
        assert_eq!(item.points, 0);
        assert_eq!(item.comments, 0);
        assert_eq!(item.submitted_at.timestamp(), 0);
        assert_eq!(item.comment_url, "https://news.ycombinator.com/item?id=5");
        assert_eq!(item.url, item.comment_url);
    }

    #[test]
    fn page_without_rows_is_empty() {
        let out = parse_page("<html><body><p>Maintenance</p></body></html>").unwrap();
        assert!(out.current.is_empty());
        assert!(out.earlier.is_empty());
    }
}
