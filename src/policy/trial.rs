//! Trial clock.
//!
//! The trial window is measured in whole calendar days from the installation
//! date. A missing installation date never grants a trial.

use chrono::NaiveDate;

/// Days remaining at or below which a trial is flagged as ending soon.
pub const WARN_SOON_DAYS: i64 = 1;

/// State of the trial window on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    /// Trial is running.
    Active {
        /// Whole days left before the trial ends.
        days_remaining: i64,
    },
    /// Trial is running but ends within [`WARN_SOON_DAYS`].
    WarnSoon {
        /// Whole days left before the trial ends.
        days_remaining: i64,
    },
    /// Trial has ended, or was never started.
    Expired,
}

impl TrialStatus {
    /// Whether the trial currently grants access (`Active` or `WarnSoon`).
    pub fn is_active(&self) -> bool {
        !matches!(self, TrialStatus::Expired)
    }

    /// Remaining days, if the trial is running.
    pub fn days_remaining(&self) -> Option<i64> {
        match *self {
            TrialStatus::Active { days_remaining } | TrialStatus::WarnSoon { days_remaining } => {
                Some(days_remaining)
            }
            TrialStatus::Expired => None,
        }
    }
}

/// Compute the trial status.
///
/// * `days_used = today - installation_date`
/// * `days_used <= trial_length_days` is active; `WarnSoon` once at most one day remains
/// * `days_used > trial_length_days` is expired
/// * no installation date is expired (fail closed)
pub fn trial_status(
    installation_date: Option<NaiveDate>,
    today: NaiveDate,
    trial_length_days: i64,
) -> TrialStatus {
    let Some(installed) = installation_date else {
        return TrialStatus::Expired;
    };

    let days_used = (today - installed).num_days();
    if days_used > trial_length_days {
        return TrialStatus::Expired;
    }

    // A clock set before the installation date does not extend the window.
    let days_remaining = trial_length_days
        .saturating_sub(days_used)
        .min(trial_length_days);

    if days_remaining <= WARN_SOON_DAYS {
        TrialStatus::WarnSoon { days_remaining }
    } else {
        TrialStatus::Active { days_remaining }
    }
}

/// Last calendar day on which the trial is still active.
///
/// Saturates at [`NaiveDate::MAX`] instead of overflowing.
pub fn trial_end_date(installation_date: NaiveDate, trial_length_days: i64) -> NaiveDate {
    chrono::Duration::try_days(trial_length_days)
        .and_then(|length| installation_date.checked_add_signed(length))
        .unwrap_or(NaiveDate::MAX)
}
