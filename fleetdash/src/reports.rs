//! Reporting windows and the pure arithmetic behind the dashboard figures.
//!
//! Everything here is independent of the record store so it can be unit tested directly:
//! window boundaries, month-over-month growth, zero-filling of day-bucketed series and page math.

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::HashMap;

/// Number of calendar days in every day-bucketed series.
pub const SERIES_DAYS: u64 = 7;

/// Length of the rolling "month" used for new-user and revenue figures.
pub const MONTH_DAYS: u64 = 30;

/// Length of the rolling "week" used for new-user figures.
pub const WEEK_DAYS: u64 = 7;

/// Reporting windows anchored on a single UTC calendar date.
///
/// All boundaries are midnight UTC, so a request made at 23:59 and one made at 00:01 see
/// different windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    today: NaiveDate,
}

impl ReportWindow {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Window for the current UTC date.
    pub fn current() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Midnight UTC `days` days before today.
    pub fn days_ago(&self, days: u64) -> DateTime<Utc> {
        midnight(self.today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    /// Start of the last 30 days.
    pub fn month_start(&self) -> DateTime<Utc> {
        self.days_ago(MONTH_DAYS)
    }

    /// Start of the last 7 days.
    pub fn week_start(&self) -> DateTime<Utc> {
        self.days_ago(WEEK_DAYS)
    }

    /// `[today - 60d, today - 30d)`: the window growth is compared against.
    pub fn previous_month(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.days_ago(2 * MONTH_DAYS), self.month_start())
    }

    /// Calendar days covered by a series, oldest first, ending today.
    pub fn series_days(&self) -> Vec<NaiveDate> {
        (0..SERIES_DAYS)
            .rev()
            .filter_map(|offset| self.today.checked_sub_days(Days::new(offset)))
            .collect()
    }

    /// Half-open timestamp range `[first series day, tomorrow)` used to query series data.
    pub fn series_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.days_ago(SERIES_DAYS - 1);
        let end = midnight(self.today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX));
        (start, end)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Month-over-month growth in percent, rounded to two decimals.
///
/// With no previous signups the result is 100 when there are new signups and 0 otherwise.
/// The value is signed and uncapped.
pub fn growth_percentage(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) as f64 / previous as f64 * 100.0)
}

/// Lay `points` onto the window's series days, substituting `T::default()` for missing days.
///
/// Points outside the window are dropped. The result always has [`SERIES_DAYS`] entries.
pub fn fill_missing_days<T>(points: impl IntoIterator<Item = (NaiveDate, T)>, window: &ReportWindow) -> Vec<(NaiveDate, T)>
where
    T: Default + Clone,
{
    let existing: HashMap<NaiveDate, T> = points.into_iter().collect();

    window
        .series_days()
        .into_iter()
        .map(|day| {
            let value = existing.get(&day).cloned().unwrap_or_default();
            (day, value)
        })
        .collect()
}

/// `ceil(count / page_size)`; zero when there is nothing to list.
pub fn total_pages(count: i64, page_size: i64) -> i64 {
    if count <= 0 || page_size <= 0 {
        return 0;
    }
    (count + page_size - 1) / page_size
}
