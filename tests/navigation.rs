//! Integration tests for browsing: key dispatch driving the navigator across
//! days, filters and sorts, with fetch completions fed in by hand.
//!
//! No network is involved; every fetch request the navigator issues is
//! answered (or left pending) explicitly by the test.

use chrono::{NaiveDate, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyModifiers};
use hckr::cache::{FailureReason, FetchRequest};
use hckr::dispatch::{dispatch, Effect};
use hckr::keybindings::KeybindingRegistry;
use hckr::model::Item;
use hckr::nav::{DayStatus, NavOptions, Navigator};
use hckr::view::{ColorBand, FilterMode, SortMode};
use pretty_assertions::assert_eq;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn story(n: usize, points: u32, comments: u32) -> Item {
    Item::new(
        n.to_string(),
        format!("Story {}", n),
        format!("https://example.com/{}", n),
        points,
        comments,
        Utc.timestamp_opt(1_709_300_000 + n as i64 * 60, 0).unwrap(),
    )
}

/// `count` stories whose points fall with rank.
fn ranked_day(count: usize) -> Vec<Item> {
    (1..=count)
        .map(|n| story(n, 1000 - n as u32, n as u32))
        .collect()
}

fn press(nav: &mut Navigator, keys: &KeybindingRegistry, c: char) -> Effect {
    match keys.action_for_key(KeyCode::Char(c), KeyModifiers::NONE) {
        Some(action) => dispatch(nav, action),
        None => Effect::None,
    }
}

fn single_request(nav: &mut Navigator) -> FetchRequest {
    let requests = nav.take_fetch_requests();
    assert_eq!(requests.len(), 1, "expected exactly one fetch request");
    requests[0]
}

fn titles(nav: &Navigator) -> Vec<String> {
    nav.current_display_list()
        .iter()
        .map(|row| row.item.title.clone())
        .collect()
}

fn open_nav(start: NaiveDate, latest: NaiveDate) -> Navigator {
    Navigator::new(
        start,
        NavOptions {
            latest: Some(latest),
            ..NavOptions::default()
        },
    )
}

#[test]
fn test_browse_day_with_keys() {
    let keys = KeybindingRegistry::new();
    let mut nav = open_nav(day(10), day(10));
    let request = single_request(&mut nav);
    assert_eq!(request.date, day(10));
    assert!(nav.apply_fetch(request.date, request.generation, Ok(ranked_day(30))));

    // Top 10 by points
    press(&mut nav, &keys, '1');
    press(&mut nav, &keys, 'p');
    assert_eq!(nav.current_display_list().len(), 10);
    assert!(nav
        .current_display_list()
        .iter()
        .all(|row| row.band == ColorBand::A));

    // Walk to the bottom and open the comments
    for _ in 0..20 {
        dispatch(&mut nav, keys.action_for_key(KeyCode::Down, KeyModifiers::NONE).unwrap());
    }
    assert_eq!(nav.selected_index(), 9);
    assert_eq!(
        press(&mut nav, &keys, 'l'),
        Effect::Open("https://news.ycombinator.com/item?id=10".to_string())
    );
    assert_eq!(
        press(&mut nav, &keys, ' '),
        Effect::Open("https://example.com/10".to_string())
    );

    // Widening the filter keeps the selection where it was
    press(&mut nav, &keys, '4');
    assert_eq!(nav.current_display_list().len(), 30);
    assert_eq!(nav.selected_index(), 9);

    assert_eq!(press(&mut nav, &keys, 'q'), Effect::Quit);
}

#[test]
fn test_back_and_forth_uses_cache() {
    let keys = KeybindingRegistry::new();
    let mut nav = open_nav(day(10), day(10));
    let first = single_request(&mut nav);
    nav.apply_fetch(first.date, first.generation, Ok(ranked_day(5)));

    // Previous day is requested, then we come back before it arrives
    press(&mut nav, &keys, 'j');
    let previous = single_request(&mut nav);
    assert_eq!(previous.date, day(9));
    press(&mut nav, &keys, 'k');

    assert!(nav.take_fetch_requests().is_empty(), "ready day must not refetch");
    assert_eq!(nav.status(), DayStatus::Ready { total: 5 });

    // The late answer lands in the cache without disturbing the current view
    assert!(nav.apply_fetch(previous.date, previous.generation, Ok(ranked_day(3))));
    assert_eq!(nav.current_date(), day(10));
    assert_eq!(nav.current_display_list().len(), 5);

    // And serves the previous day instantly afterwards
    press(&mut nav, &keys, 'j');
    assert!(nav.take_fetch_requests().is_empty());
    assert_eq!(nav.status(), DayStatus::Ready { total: 3 });
}

#[test]
fn test_cannot_pass_latest_day() {
    let keys = KeybindingRegistry::new();
    let mut nav = open_nav(day(20), day(12));
    assert_eq!(nav.current_date(), day(12));
    assert!(!nav.can_go_forward());

    press(&mut nav, &keys, 'k');
    assert_eq!(nav.current_date(), day(12));
    assert_eq!(nav.take_fetch_requests().len(), 1);
}

#[test]
fn test_refresh_recovers_failed_day() {
    let keys = KeybindingRegistry::new();
    let mut nav = open_nav(day(10), day(10));
    let first = single_request(&mut nav);
    nav.apply_fetch(first.date, first.generation, Err(FailureReason::NetworkError));
    assert_eq!(nav.status(), DayStatus::Failed(FailureReason::NetworkError));
    assert!(nav.current_display_list().is_empty());

    // Nothing to open while failed
    assert_eq!(press(&mut nav, &keys, ' '), Effect::None);

    press(&mut nav, &keys, 'r');
    let retry = single_request(&mut nav);
    assert!(retry.generation > first.generation);
    assert_eq!(nav.status(), DayStatus::Loading);

    // The original attempt reporting again is stale
    assert!(!nav.apply_fetch(first.date, first.generation, Ok(ranked_day(2))));

    assert!(nav.apply_fetch(retry.date, retry.generation, Ok(ranked_day(4))));
    assert_eq!(
        titles(&nav),
        vec!["Story 1", "Story 2", "Story 3", "Story 4"]
    );
}

#[test]
fn test_sort_scenario_points() {
    let mut nav = Navigator::new(day(1), NavOptions::default());
    let request = single_request(&mut nav);
    nav.apply_fetch(
        request.date,
        request.generation,
        Ok(vec![
            Item::new("a", "A", "https://a", 50, 0, Utc.timestamp_opt(1, 0).unwrap()),
            Item::new("b", "B", "https://b", 30, 0, Utc.timestamp_opt(2, 0).unwrap()),
            Item::new("c", "C", "https://c", 90, 0, Utc.timestamp_opt(3, 0).unwrap()),
        ]),
    );

    nav.set_sort(SortMode::ByPoints);
    assert_eq!(titles(&nav), vec!["C", "A", "B"]);
    assert!(nav
        .current_display_list()
        .iter()
        .all(|row| row.band == ColorBand::A));

    nav.set_filter(FilterMode::Top50Pct);
    assert_eq!(titles(&nav), vec!["A", "B"]);
}

#[test]
fn test_homepage_filter_without_flags_shows_all() {
    let keys = KeybindingRegistry::new();
    let mut nav = Navigator::new(day(1), NavOptions::default());
    let request = single_request(&mut nav);
    nav.apply_fetch(request.date, request.generation, Ok(ranked_day(12)));

    press(&mut nav, &keys, '5');
    assert_eq!(nav.filter_mode(), FilterMode::AllViaHomepage);
    assert_eq!(nav.current_display_list().len(), 12);
}

#[test]
fn test_empty_day_is_reported() {
    let mut nav = Navigator::new(day(1), NavOptions::default());
    let request = single_request(&mut nav);
    nav.apply_fetch(request.date, request.generation, Ok(Vec::new()));
    assert_eq!(nav.status(), DayStatus::Failed(FailureReason::EmptyResponse));
    assert!(nav.selected_item().is_none());
}
