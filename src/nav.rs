//! Navigation controller.
//!
//! Owns the [`ViewState`] and the [`DayCache`]. Every operation is synchronous:
//! fetches are not started here but queued as [`FetchRequest`]s, which the
//! application shell drains with [`Navigator::take_fetch_requests`] and turns
//! into background tasks. Completions come back through
//! [`Navigator::apply_fetch`].

use crate::cache::{DayCache, DayEntry, FailureReason, FetchRequest, FetchState, DEFAULT_CAPACITY};
use crate::model::Item;
use crate::view::{derive, DisplayRow, FilterMode, SortMode};
use chrono::{Days, NaiveDate};

/// What the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub current_date: NaiveDate,
    pub filter_mode: FilterMode,
    pub sort_mode: SortMode,
    pub selected_index: usize,
}

/// Load state of the current day, as the renderer needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Loading,
    Ready { total: usize },
    Failed(FailureReason),
}

/// Construction options for [`Navigator`].
#[derive(Debug, Clone, Copy)]
pub struct NavOptions {
    pub filter: FilterMode,
    pub sort: SortMode,
    pub cache_days: usize,
    /// Most recent day the archive publishes. `None` leaves dates unbounded.
    pub latest: Option<NaiveDate>,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            filter: FilterMode::default(),
            sort: SortMode::default(),
            cache_days: DEFAULT_CAPACITY,
            latest: None,
        }
    }
}

pub struct Navigator {
    view: ViewState,
    cache: DayCache,
    latest: Option<NaiveDate>,
    outbox: Vec<FetchRequest>,
    /// Selection to restore once a refreshed day arrives.
    restore_selection: Option<usize>,
}

impl Navigator {
    /// Start on `start` (clamped to `options.latest`) and request its items.
    pub fn new(start: NaiveDate, options: NavOptions) -> Self {
        let start = match options.latest {
            Some(latest) if start > latest => latest,
            _ => start,
        };

        let mut nav = Self {
            view: ViewState {
                current_date: start,
                filter_mode: options.filter,
                sort_mode: options.sort,
                selected_index: 0,
            },
            cache: DayCache::new(options.cache_days),
            latest: options.latest,
            outbox: Vec::new(),
            restore_selection: None,
        };
        nav.load_current();
        nav
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn current_date(&self) -> NaiveDate {
        self.view.current_date
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.view.filter_mode
    }

    pub fn sort_mode(&self) -> SortMode {
        self.view.sort_mode
    }

    pub fn selected_index(&self) -> usize {
        self.view.selected_index
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.latest
    }

    pub fn cache(&self) -> &DayCache {
        &self.cache
    }

    /// Update the latest published day, e.g. after the archive rolls over at
    /// midnight. Returns whether it changed.
    pub fn set_latest(&mut self, latest: NaiveDate) -> bool {
        if self.latest == Some(latest) {
            return false;
        }
        tracing::info!(previous = ?self.latest, %latest, "Latest archive day changed");
        self.latest = Some(latest);
        true
    }

    /// True when `go_to_date(1)` would move.
    pub fn can_go_forward(&self) -> bool {
        self.latest.map_or(true, |latest| self.view.current_date < latest)
    }

    fn current_entry(&self) -> Option<&DayEntry> {
        self.cache.get(self.view.current_date)
    }

    pub fn status(&self) -> DayStatus {
        match self.current_entry().map(DayEntry::state) {
            Some(FetchState::Ready) => DayStatus::Ready {
                total: self.current_entry().map_or(0, |e| e.items().len()),
            },
            Some(FetchState::Failed(reason)) => DayStatus::Failed(reason),
            Some(FetchState::Pending) | None => DayStatus::Loading,
        }
    }

    // ========================================================================
    // Derived view
    // ========================================================================

    /// Filtered, sorted rows for the current day. Empty unless the day is ready.
    pub fn current_display_list(&self) -> Vec<DisplayRow<'_>> {
        match self.current_entry() {
            Some(entry) if entry.is_ready() => {
                derive(entry.items(), self.view.filter_mode, self.view.sort_mode)
            }
            _ => Vec::new(),
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.current_display_list()
            .get(self.view.selected_index)
            .map(|row| row.item)
    }

    fn display_len(&self) -> usize {
        self.current_display_list().len()
    }

    fn clamp_selection(&mut self) {
        let len = self.display_len();
        self.view.selected_index = self.view.selected_index.min(len.saturating_sub(1));
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Move `delta` days, stopping at the latest published day.
    ///
    /// Returns `false` if the date did not change.
    pub fn go_to_date(&mut self, delta: i64) -> bool {
        let current = self.view.current_date;
        let target = if delta >= 0 {
            current.checked_add_days(Days::new(delta.unsigned_abs()))
        } else {
            current.checked_sub_days(Days::new(delta.unsigned_abs()))
        };
        let Some(mut target) = target else {
            return false;
        };
        if let Some(latest) = self.latest {
            target = target.min(latest);
        }
        if target == current {
            return false;
        }

        tracing::debug!(from = %current, to = %target, "Changing day");
        self.view.current_date = target;
        self.view.selected_index = 0;
        self.restore_selection = None;
        self.load_current();
        true
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        if self.view.filter_mode != mode {
            self.view.filter_mode = mode;
            self.restore_selection = None;
        }
        self.clamp_selection();
    }

    pub fn set_sort(&mut self, mode: SortMode) {
        if self.view.sort_mode != mode {
            self.view.sort_mode = mode;
            self.restore_selection = None;
        }
        self.clamp_selection();
    }

    /// Re-fetch the current day, keeping modes and (where still valid) the selection.
    pub fn refresh(&mut self) {
        let date = self.view.current_date;
        self.cache.protect(date);
        let request = self.cache.refresh(date);
        self.outbox.push(request);

        if self.restore_selection.is_none() {
            self.restore_selection = Some(self.view.selected_index);
        }
        self.view.selected_index = 0;
    }

    /// Move the selection by `delta` rows, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.display_len();
        if len == 0 {
            return;
        }
        let max = len - 1;
        self.view.selected_index = self
            .view
            .selected_index
            .saturating_add_signed(delta)
            .min(max);
    }

    pub fn select_first(&mut self) {
        self.view.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.view.selected_index = self.display_len().saturating_sub(1);
    }

    /// Report a fetch completion. Returns whether it was applied.
    pub fn apply_fetch(
        &mut self,
        date: NaiveDate,
        generation: u64,
        result: Result<Vec<Item>, FailureReason>,
    ) -> bool {
        let applied = self.cache.complete(date, generation, result);
        if applied && date == self.view.current_date {
            if let Some(previous) = self.restore_selection.take() {
                self.view.selected_index = previous;
            }
            self.clamp_selection();
        }
        applied
    }

    /// Drain fetch requests issued since the last call.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn load_current(&mut self) {
        let date = self.view.current_date;
        self.cache.protect(date);
        let (_, request) = self.cache.get_or_fetch(date);
        if let Some(request) = request {
            self.outbox.push(request);
        }
        self.clamp_selection();
    }
}
