//! Renewal reminders for signed licenses.

use chrono::NaiveDate;

/// Whole days from `today` until `expiry` (0 on the expiry day).
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Days remaining if a renewal reminder should be shown, else `None`.
///
/// Returns `None` once the license has expired; that is an error, not a reminder.
pub fn renewal_due(expiry: NaiveDate, today: NaiveDate, warning_days: i64) -> Option<i64> {
    let days = days_until_expiry(expiry, today);
    (0..=warning_days).contains(&days).then_some(days)
}
