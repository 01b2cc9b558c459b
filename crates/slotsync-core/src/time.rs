//! Time windows for availability queries.
//!
//! A [`TimeWindow`] is the half-open range `[start, end)` over which busy
//! intervals are collected and free slots computed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A query window, half-open `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window starting at `start` extending the given duration.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn creation() {
        let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
        assert_eq!(window.duration(), Duration::hours(8));
    }

    #[test]
    #[should_panic(expected = "start must be <= end")]
    fn invalid_window() {
        TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
    }

    #[test]
    fn contains_is_half_open() {
        let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
        assert!(window.contains(utc(2025, 2, 5, 9, 0, 0)));
        assert!(window.contains(utc(2025, 2, 5, 16, 59, 59)));
        assert!(!window.contains(utc(2025, 2, 5, 17, 0, 0)));
        assert!(!window.contains(utc(2025, 2, 5, 8, 59, 59)));
    }

    #[test]
    fn from_duration() {
        let start = utc(2025, 2, 5, 10, 0, 0);
        let window = TimeWindow::from_duration(start, Duration::hours(2));
        assert_eq!(window.end, utc(2025, 2, 5, 12, 0, 0));
    }

    #[test]
    fn serde_roundtrip() {
        let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
        let json = serde_json::to_string(&window).unwrap();
        let parsed: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(window, parsed);
    }
}
