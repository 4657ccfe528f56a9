//! Deterministic clock abstraction for date-dependent logic.
//!
//! Everything in this crate works on calendar dates. Expiry and trial
//! windows are compared day-by-day, never by time of day.

use chrono::{Local, NaiveDate};

/// Source of "today" for expiry and trial computations.
pub trait Clock: Send + Sync {
    /// The current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// System clock using the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Mock clock for deterministic testing.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    today: NaiveDate,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Create a mock clock frozen at the given date.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Create a mock clock from a `YYYY-MM-DD` string.
    pub fn from_ymd(s: &str) -> Self {
        Self {
            today: NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid YYYY-MM-DD date"),
        }
    }

    /// Advance the clock by a number of days.
    pub fn advance_days(&mut self, days: i64) {
        self.today += chrono::Duration::days(days);
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}
