//! Machine availability: working windows and downtime.
//!
//! # Time Model
//! All times are in milliseconds relative to the schedule epoch.
//!
//! # Precedence
//! Downtime overrides working windows. A span is available iff:
//! - It lies within one `working_windows` entry (or none are defined), AND
//! - It does NOT overlap any `downtime` entry.

use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (ms, inclusive).
    pub start_ms: i64,
    /// Interval end (ms, exclusive).
    pub end_ms: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Whether `[start_ms, start_ms + duration_ms)` overlaps this window.
    ///
    /// A zero-length span overlaps only if its instant lies inside.
    pub fn overlaps_span(&self, start_ms: i64, duration_ms: i64) -> bool {
        if duration_ms <= 0 {
            return self.contains(start_ms);
        }
        start_ms < self.end_ms && self.start_ms < start_ms + duration_ms
    }
}

/// When a machine can process work.
///
/// With no working windows the machine is available around the clock,
/// minus downtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Availability {
    /// Periods in which the machine works. Empty = always.
    pub working_windows: Vec<TimeWindow>,
    /// Periods in which the machine is down (overrides working windows).
    pub downtime: Vec<TimeWindow>,
}

impl Availability {
    /// Always available, no downtime.
    pub fn always() -> Self {
        Self::default()
    }

    /// Adds a working window.
    pub fn with_working_window(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.working_windows.push(TimeWindow::new(start_ms, end_ms));
        self
    }

    /// Adds a downtime window.
    pub fn with_downtime(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.downtime.push(TimeWindow::new(start_ms, end_ms));
        self
    }

    /// Whether no window of either kind is defined.
    pub fn is_unrestricted(&self) -> bool {
        self.working_windows.is_empty() && self.downtime.is_empty()
    }

    /// Earliest start at or after `from_ms` where a span of `duration_ms`
    /// lies inside one working window and clear of all downtime.
    ///
    /// Returns `None` if no such start exists.
    pub fn earliest_fit(&self, from_ms: i64, duration_ms: i64) -> Option<i64> {
        let mut candidate = from_ms;

        // Each downtime hit moves the candidate past that window's end, so
        // the loop runs at most `downtime.len() + 1` times.
        loop {
            if !self.working_windows.is_empty() {
                candidate = self
                    .working_windows
                    .iter()
                    .filter_map(|w| {
                        let start = w.start_ms.max(candidate);
                        (start + duration_ms.max(0) <= w.end_ms && start < w.end_ms)
                            .then_some(start)
                    })
                    .min()?;
            }

            let blocked_until = self
                .downtime
                .iter()
                .filter(|d| d.overlaps_span(candidate, duration_ms))
                .map(|d| d.end_ms)
                .max();

            match blocked_until {
                Some(end) if end > candidate => candidate = end,
                Some(_) => return None,
                None => return Some(candidate),
            }
        }
    }

    /// Downtime windows starting before `time_ms`, sorted by start.
    pub fn downtime_before(&self, time_ms: i64) -> Vec<TimeWindow> {
        let mut windows: Vec<TimeWindow> = self
            .downtime
            .iter()
            .copied()
            .filter(|w| w.start_ms < time_ms)
            .collect();
        windows.sort_by_key(|w| w.start_ms);
        windows
    }
}
