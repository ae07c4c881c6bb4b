//! All company-calendar arithmetic lives here: the fixed UTC+5:30 offset,
//! day boundaries, Sunday detection and hour rounding. Call sites must not
//! do their own offset math.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use once_cell::sync::Lazy;

/// Company local time is fixed at UTC+5:30 (Asia/Kolkata, no DST).
pub static COMPANY_TZ: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("offset in range"));

/// The calendar date at `now`, in company local time.
pub fn company_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&*COMPANY_TZ).date_naive()
}

/// Converts a company-local wall-clock instant to UTC.
pub fn local_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(COMPANY_TZ.local_minus_utc()))).and_utc()
}

/// The UTC instant at which `time` occurs on company-local `date`.
/// Used for the daily overtime threshold.
pub fn threshold_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    local_to_utc(date.and_time(time))
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// True if any day of the inclusive [start, end] range is a Sunday.
pub fn range_has_sunday(start: NaiveDate, end: NaiveDate) -> bool {
    if end < start {
        return false;
    }
    // A span of 7+ days always contains a Sunday.
    if (end - start).num_days() >= 6 {
        return true;
    }
    start.iter_days().take_while(|d| *d <= end).any(is_sunday)
}

/// Day count of the inclusive [start, end] range.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Raw (unrounded) hours between two instants.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Rounds hours to 2 decimal places, half-up.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
