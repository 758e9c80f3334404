//! Calendar window splitting.
//!
//! Trakt caps calendar requests at [`MAX_DAYS_PER_REQUEST`] days, so longer
//! ranges are fetched as consecutive windows that tile the range exactly.

use chrono::{Days, Local, NaiveDate};

/// Largest day count the calendar endpoints accept.
pub const MAX_DAYS_PER_REQUEST: u32 = 33;

/// One calendar request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    /// First day of the window.
    pub from: NaiveDate,
    /// Number of days covered.
    pub days: u32,
}

impl CalendarWindow {
    /// Start date as sent to Trakt (`YYYY-MM-DD`).
    pub fn start_date(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }
}

/// Split `total` into chunks of `by`, the last one holding the remainder.
///
/// Returns an empty vector when either argument is zero.
pub fn split(total: u32, by: u32) -> Vec<u32> {
    if total == 0 || by == 0 {
        return Vec::new();
    }

    let count = total.div_ceil(by);
    let rest = total % by;
    (0..count)
        .map(|i| {
            if i + 1 == count && rest != 0 {
                rest
            } else {
                by
            }
        })
        .collect()
}

/// Chain windows end to end starting at `anchor`.
pub fn compute_calendar_windows(
    days_to_fetch: u32,
    max_days_per_request: u32,
    anchor: NaiveDate,
) -> Vec<CalendarWindow> {
    let mut from = anchor;
    let mut windows = Vec::new();
    for days in split(days_to_fetch, max_days_per_request) {
        windows.push(CalendarWindow { from, days });
        from = from
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
    }
    windows
}

/// Yesterday in local time. Starting a day early absorbs timezone skew.
pub fn calendar_anchor() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}
