//! Busy intervals and free-slot computation.
//!
//! Calendars report availability as a list of busy intervals that may be
//! unsorted, overlapping, or partially outside the queried window.
//! [`merge_busy`] normalizes such a list into a minimal sorted set, and
//! [`free_slots`] returns the complementary gaps within the window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeWindow;

/// A half-open time range `[start, end)` during which a calendar reports
/// its owner unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Start of the interval (inclusive).
    pub start: DateTime<Utc>,
    /// End of the interval (exclusive).
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Creates a new interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if this interval covers no time at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Restricts this interval to the given window.
    ///
    /// The result may be empty when the interval lies outside the window.
    fn clip(&self, window: &TimeWindow) -> Interval {
        Interval::new(self.start.max(window.start), self.end.min(window.end))
    }
}

/// Clips a list of intervals to `window` and merges overlapping or touching
/// ones into a minimal sorted, pairwise-disjoint set.
///
/// Touching intervals (`next.start == current.end`) are joined. Degenerate
/// intervals (`start == end`) are accepted and never appear in the output.
/// An empty input yields an empty result.
pub fn merge_busy(intervals: &[Interval], window: &TimeWindow) -> Vec<Interval> {
    let mut clipped: Vec<Interval> = intervals
        .iter()
        .map(|interval| interval.clip(window))
        .filter(|interval| !interval.is_empty())
        .collect();
    clipped.sort_by_key(|interval| interval.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Returns the gaps in `window` not covered by `merged_busy`.
///
/// `merged_busy` must be sorted and pairwise disjoint, i.e. the output of
/// [`merge_busy`]. Zero-length slots are never emitted; an empty busy set
/// yields the entire window as one slot.
pub fn free_slots(window: &TimeWindow, merged_busy: &[Interval]) -> Vec<Interval> {
    let mut slots = Vec::new();
    let mut cursor = window.start;

    for busy in merged_busy {
        if busy.start > cursor {
            slots.push(Interval::new(cursor, busy.start.min(window.end)));
        }
        if busy.end > cursor {
            cursor = busy.end.min(window.end);
        }
    }

    if cursor < window.end {
        slots.push(Interval::new(cursor, window.end));
    }
    slots
}
