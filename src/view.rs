//! Filter/sort engine.
//!
//! `derive` is a pure function from a day's items and the two view modes to
//! the rows the renderer paints. Color bands are computed from the original
//! rank in the full day list before any filtering or re-sorting, so a story
//! that was top-10 for the day keeps its band under every view.

use crate::model::Item;
use std::cmp::Ordering;

// ============================================================================
// Modes
// ============================================================================

/// Which slice of the day's items is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Top10,
    Top20,
    Top50Pct,
    AllViaHomepage,
    #[default]
    All,
}

impl FilterMode {
    pub const ALL: [FilterMode; 5] = [
        FilterMode::Top10,
        FilterMode::Top20,
        FilterMode::Top50Pct,
        FilterMode::AllViaHomepage,
        FilterMode::All,
    ];

    /// Parse a mode name from config or CLI (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top10" | "top_10" => Some(Self::Top10),
            "top20" | "top_20" => Some(Self::Top20),
            "top50" | "top_50" | "top50pct" | "top_half" | "half" => Some(Self::Top50Pct),
            "homepage" | "all_via_homepage" | "frontpage" => Some(Self::AllViaHomepage),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Top10 => "Top 10",
            Self::Top20 => "Top 20",
            Self::Top50Pct => "Top 50%",
            Self::AllViaHomepage => "Homepage",
            Self::All => "All",
        }
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    ByPoints,
    ByComments,
    #[default]
    ByDate,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::ByPoints, SortMode::ByComments, SortMode::ByDate];

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" | "by_points" | "score" => Some(Self::ByPoints),
            "comments" | "by_comments" => Some(Self::ByComments),
            "date" | "by_date" | "time" => Some(Self::ByDate),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ByPoints => "Points",
            Self::ByComments => "Comments",
            Self::ByDate => "Date",
        }
    }

    /// Primary key comparison; ties are broken by rank in `derive`.
    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::ByPoints => b.points.cmp(&a.points),
            Self::ByComments => b.comments.cmp(&a.comments),
            Self::ByDate => a.submitted_at.cmp(&b.submitted_at),
        }
    }
}

// ============================================================================
// Color bands
// ============================================================================

/// Visual category derived from original rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorBand {
    /// Ranks 1-10.
    A,
    /// Ranks 11-20.
    B,
    /// Remaining ranks within the top half of the day.
    C,
    /// Everything else.
    D,
}

impl ColorBand {
    /// Band for a 1-based `rank` in a day of `total` items.
    pub fn for_rank(rank: usize, total: usize) -> Self {
        if rank <= 10 {
            Self::A
        } else if rank <= 20 {
            Self::B
        } else if rank <= half_ceil(total) {
            Self::C
        } else {
            Self::D
        }
    }

    /// Theme role used to paint rows in this band.
    pub fn role(self) -> &'static str {
        match self {
            Self::A => "band_a",
            Self::B => "band_b",
            Self::C => "band_c",
            Self::D => "band_d",
        }
    }
}

fn half_ceil(n: usize) -> usize {
    n.div_ceil(2)
}

// ============================================================================
// Derivation
// ============================================================================

/// One row of the display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRow<'a> {
    pub item: &'a Item,
    /// 1-based rank in the full, unfiltered day list.
    pub rank: usize,
    pub band: ColorBand,
}

/// True if any item carries a homepage flag, set or unset.
fn source_has_homepage_flag(items: &[Item]) -> bool {
    items.iter().any(|i| i.homepage.is_some())
}

/// Derive the display list for `items` under the given modes.
pub fn derive(items: &[Item], filter: FilterMode, sort: SortMode) -> Vec<DisplayRow<'_>> {
    let total = items.len();
    let ranked = items.iter().enumerate().map(|(i, item)| DisplayRow {
        item,
        rank: i + 1,
        band: ColorBand::for_rank(i + 1, total),
    });

    let mut rows: Vec<DisplayRow<'_>> = match filter {
        FilterMode::Top10 => ranked.take(10).collect(),
        FilterMode::Top20 => ranked.take(20).collect(),
        FilterMode::Top50Pct => ranked.take(half_ceil(total)).collect(),
        FilterMode::AllViaHomepage if source_has_homepage_flag(items) => ranked
            .filter(|row| row.item.homepage == Some(true))
            .collect(),
        FilterMode::AllViaHomepage | FilterMode::All => ranked.collect(),
    };

    rows.sort_by(|a, b| sort.compare(a.item, b.item).then(a.rank.cmp(&b.rank)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(title: &str, points: u32, comments: u32, ts: i64) -> Item {
        Item::new(
            title,
            title,
            format!("https://example.com/{title}"),
            points,
            comments,
            Utc.timestamp_opt(ts, 0).unwrap(),
        )
    }

    fn titles(rows: &[DisplayRow<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.item.title.clone()).collect()
    }

    fn day(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| item(&format!("s{i}"), (i as u32 * 7) % 13, (i as u32 * 5) % 11, 1000 - i as i64))
            .collect()
    }

    #[test]
    fn sort_by_points_scenario() {
        let items = vec![item("A", 50, 0, 1), item("B", 30, 0, 2), item("C", 90, 0, 3)];
        let rows = derive(&items, FilterMode::All, SortMode::ByPoints);

        assert_eq!(titles(&rows), vec!["C", "A", "B"]);
        assert!(rows.iter().all(|r| r.band == ColorBand::A));
        assert_eq!(rows[0].rank, 3);
    }

    #[test]
    fn top_half_of_seven_is_four() {
        let items = day(7);
        let rows = derive(&items, FilterMode::Top50Pct, SortMode::ByPoints);
        let mut ranks: Vec<usize> = rows.iter().map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn top_filters_cap_at_list_length() {
        let items = day(5);
        assert_eq!(derive(&items, FilterMode::Top10, SortMode::ByDate).len(), 5);
        assert_eq!(derive(&items, FilterMode::Top20, SortMode::ByDate).len(), 5);
    }

    #[test]
    fn empty_day_yields_empty_list() {
        for filter in FilterMode::ALL {
            for sort in SortMode::ALL {
                assert!(derive(&[], filter, sort).is_empty());
            }
        }
    }

    #[test]
    fn ties_break_by_rank() {
        let items = vec![item("A", 10, 3, 5), item("B", 10, 3, 5), item("C", 20, 3, 5)];
        assert_eq!(
            titles(&derive(&items, FilterMode::All, SortMode::ByPoints)),
            vec!["C", "A", "B"]
        );
        assert_eq!(
            titles(&derive(&items, FilterMode::All, SortMode::ByComments)),
            vec!["A", "B", "C"]
        );
        assert_eq!(
            titles(&derive(&items, FilterMode::All, SortMode::ByDate)),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn sort_by_date_is_ascending() {
        let items = vec![item("late", 0, 0, 300), item("early", 0, 0, 100), item("mid", 0, 0, 200)];
        assert_eq!(
            titles(&derive(&items, FilterMode::All, SortMode::ByDate)),
            vec!["early", "mid", "late"]
        );
    }

    #[test]
    fn homepage_filter_uses_flag() {
        let items = vec![
            item("A", 1, 0, 1).with_homepage(true),
            item("B", 1, 0, 2).with_homepage(false),
            item("C", 1, 0, 3),
            item("D", 1, 0, 4).with_homepage(true),
        ];
        let rows = derive(&items, FilterMode::AllViaHomepage, SortMode::ByDate);
        assert_eq!(titles(&rows), vec!["A", "D"]);
        assert_eq!(rows[1].rank, 4);
    }

    #[test]
    fn homepage_filter_degrades_to_all_without_flags() {
        let items = day(6);
        assert_eq!(
            derive(&items, FilterMode::AllViaHomepage, SortMode::ByPoints),
            derive(&items, FilterMode::All, SortMode::ByPoints)
        );
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ColorBand::for_rank(10, 100), ColorBand::A);
        assert_eq!(ColorBand::for_rank(11, 100), ColorBand::B);
        assert_eq!(ColorBand::for_rank(20, 100), ColorBand::B);
        assert_eq!(ColorBand::for_rank(21, 100), ColorBand::C);
        assert_eq!(ColorBand::for_rank(50, 100), ColorBand::C);
        assert_eq!(ColorBand::for_rank(51, 100), ColorBand::D);
        // Top half smaller than 20: nothing lands in C
        assert_eq!(ColorBand::for_rank(21, 30), ColorBand::D);
        // Odd totals round the half up
        assert_eq!(ColorBand::for_rank(26, 51), ColorBand::C);
        assert_eq!(ColorBand::for_rank(27, 51), ColorBand::D);
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(FilterMode::from_str_name("Top10"), Some(FilterMode::Top10));
        assert_eq!(FilterMode::from_str_name("top_half"), Some(FilterMode::Top50Pct));
        assert_eq!(FilterMode::from_str_name("homepage"), Some(FilterMode::AllViaHomepage));
        assert_eq!(FilterMode::from_str_name("bogus"), None);
        assert_eq!(SortMode::from_str_name("POINTS"), Some(SortMode::ByPoints));
        assert_eq!(SortMode::from_str_name("date"), Some(SortMode::ByDate));
        assert_eq!(SortMode::from_str_name(""), None);
    }

    fn arb_items() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(
            (0u32..500, 0u32..200, 0i64..10_000, prop::option::of(any::<bool>())),
            0..80,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (points, comments, ts, homepage))| {
                    let mut it = item(&format!("s{i}"), points, comments, ts);
                    it.homepage = homepage;
                    it
                })
                .collect()
        })
    }

    fn arb_filter() -> impl Strategy<Value = FilterMode> {
        prop::sample::select(FilterMode::ALL.to_vec())
    }

    fn arb_sort() -> impl Strategy<Value = SortMode> {
        prop::sample::select(SortMode::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn derive_is_deterministic(items in arb_items(), filter in arb_filter(), sort in arb_sort()) {
            prop_assert_eq!(derive(&items, filter, sort), derive(&items, filter, sort));
        }

        #[test]
        fn filters_are_nested_rank_prefixes(items in arb_items(), sort in arb_sort()) {
            let ranks = |f: FilterMode| {
                let mut r: Vec<usize> = derive(&items, f, sort).iter().map(|row| row.rank).collect();
                r.sort_unstable();
                r
            };
            let top10 = ranks(FilterMode::Top10);
            let top20 = ranks(FilterMode::Top20);
            let half = ranks(FilterMode::Top50Pct);
            let all = ranks(FilterMode::All);

            prop_assert_eq!(&all, &(1..=items.len()).collect::<Vec<_>>());
            for subset in [&top10, &top20, &half] {
                prop_assert_eq!(subset.as_slice(), &all[..subset.len()]);
            }
            prop_assert_eq!(top10.len(), items.len().min(10));
            prop_assert_eq!(top20.len(), items.len().min(20));
            prop_assert_eq!(half.len(), items.len().div_ceil(2));
        }

        #[test]
        fn band_is_invariant_across_modes(items in arb_items()) {
            let mut by_rank = vec![None; items.len() + 1];
            for row in derive(&items, FilterMode::All, SortMode::ByDate) {
                by_rank[row.rank] = Some(row.band);
            }
            for filter in FilterMode::ALL {
                for sort in SortMode::ALL {
                    for row in derive(&items, filter, sort) {
                        prop_assert_eq!(Some(row.band), by_rank[row.rank]);
                        prop_assert_eq!(row.band, ColorBand::for_rank(row.rank, items.len()));
                    }
                }
            }
        }

        #[test]
        fn sorted_output_respects_key(items in arb_items(), filter in arb_filter()) {
            let rows = derive(&items, filter, SortMode::ByPoints);
            for pair in rows.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.item.points > b.item.points
                    || (a.item.points == b.item.points && a.rank < b.rank));
            }
        }
    }
}
