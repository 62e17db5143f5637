//! Day cache: memoized item lists keyed by calendar date.
//!
//! Entries move through `Pending -> Ready | Failed`. A missing date gets a
//! `Pending` entry plus exactly one [`FetchRequest`]; asking again while it is
//! still pending issues nothing. Each (re)fetch is stamped with a cache-wide
//! generation so completions for superseded or evicted entries are dropped.
//!
//! Capacity is enforced LRU-first, skipping the protected (displayed) date.

use crate::model::Item;
use chrono::NaiveDate;
use lru::LruCache;
use std::sync::Arc;

/// Default number of days kept in memory.
pub const DEFAULT_CAPACITY: usize = 14;

/// Why a day could not be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Transport or HTTP-level failure.
    NetworkError,
    /// The body was not a JSON array of stories.
    MalformedResponse,
    /// A valid response with no stories in it.
    EmptyResponse,
}

impl FailureReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::NetworkError => "Network error",
            Self::MalformedResponse => "Malformed response",
            Self::EmptyResponse => "No stories for this day",
        }
    }
}

/// Lifecycle of one cached day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Pending,
    Ready,
    Failed(FailureReason),
}

/// A fetch the owner must start in the background.
///
/// The completion must be reported back with the same `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub date: NaiveDate,
    pub generation: u64,
}

/// One cached day.
#[derive(Debug, Clone)]
pub struct DayEntry {
    pub date: NaiveDate,
    items: Arc<[Item]>,
    state: FetchState,
    generation: u64,
}

impl DayEntry {
    fn pending(date: NaiveDate, generation: u64) -> Self {
        Self {
            date,
            items: Arc::from(Vec::new()),
            state: FetchState::Pending,
            generation,
        }
    }

    /// Items in original rank order. Empty unless the entry is `Ready`.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ready(&self) -> bool {
        self.state == FetchState::Ready
    }
}

/// Bounded, LRU-ordered map from date to [`DayEntry`].
pub struct DayCache {
    entries: LruCache<NaiveDate, DayEntry>,
    capacity: usize,
    protected: Option<NaiveDate>,
    next_generation: u64,
}

impl DayCache {
    /// Create a cache holding at most `capacity` days (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            capacity: capacity.max(1),
            protected: None,
            next_generation: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains(&date)
    }

    /// Mark `date` as the displayed day. It is never chosen for eviction.
    pub fn protect(&mut self, date: NaiveDate) {
        self.protected = Some(date);
    }

    /// Look up an entry without touching LRU order.
    pub fn get(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.entries.peek(&date)
    }

    /// Return the entry for `date`, creating a `Pending` one if absent.
    ///
    /// A [`FetchRequest`] is returned only when the entry was created here.
    pub fn get_or_fetch(&mut self, date: NaiveDate) -> (&DayEntry, Option<FetchRequest>) {
        let request = if self.entries.contains(&date) {
            None
        } else {
            self.evict_to_fit();
            let generation = self.bump_generation();
            tracing::debug!(%date, generation, "Day not cached, requesting fetch");
            Some(FetchRequest { date, generation })
        };

        let generation = request.map(|r| r.generation).unwrap_or_default();
        let entry = self
            .entries
            .get_or_insert(date, || DayEntry::pending(date, generation));
        (entry, request)
    }

    /// Reset `date` to `Pending` and issue a new fetch.
    ///
    /// Any fetch still running for the old generation becomes stale.
    pub fn refresh(&mut self, date: NaiveDate) -> FetchRequest {
        let generation = self.bump_generation();

        if let Some(entry) = self.entries.get_mut(&date) {
            tracing::debug!(
                %date,
                previous = entry.generation,
                generation,
                "Refreshing cached day"
            );
            *entry = DayEntry::pending(date, generation);
        } else {
            self.evict_to_fit();
            tracing::debug!(%date, generation, "Refreshing uncached day");
            self.entries.put(date, DayEntry::pending(date, generation));
        }

        FetchRequest { date, generation }
    }

    /// Apply a fetch completion.
    ///
    /// Returns `false` (and changes nothing) if the entry is gone, no longer
    /// `Pending`, or pending under a different generation.
    pub fn complete(
        &mut self,
        date: NaiveDate,
        generation: u64,
        result: Result<Vec<Item>, FailureReason>,
    ) -> bool {
        let Some(entry) = self.entries.peek_mut(&date) else {
            tracing::debug!(%date, generation, "Discarding completion for evicted day");
            return false;
        };

        if entry.state != FetchState::Pending || entry.generation != generation {
            tracing::debug!(
                %date,
                got = generation,
                current = entry.generation,
                state = ?entry.state,
                "Discarding stale completion"
            );
            return false;
        }

        match result {
            Ok(items) if items.is_empty() => {
                entry.state = FetchState::Failed(FailureReason::EmptyResponse);
            }
            Ok(items) => {
                tracing::debug!(%date, generation, count = items.len(), "Day loaded");
                entry.items = Arc::from(items);
                entry.state = FetchState::Ready;
            }
            Err(reason) => {
                tracing::debug!(%date, generation, ?reason, "Day failed");
                entry.state = FetchState::Failed(reason);
            }
        }
        true
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.next_generation
    }

    /// Make room for one insertion.
    fn evict_to_fit(&mut self) {
        while self.entries.len() >= self.capacity {
            let Some((&oldest, _)) = self.entries.peek_lru() else {
                break;
            };

            if Some(oldest) == self.protected {
                if self.entries.len() == 1 {
                    break;
                }
                self.entries.promote(&oldest);
                continue;
            }

            self.entries.pop_lru();
            tracing::debug!(date = %oldest, capacity = self.capacity, "Evicted cached day");
        }
    }
}

impl Default for DayCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
