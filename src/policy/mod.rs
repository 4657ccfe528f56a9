//! Date-window policies: trial clock and renewal reminders.

pub mod renewal;
pub mod trial;
