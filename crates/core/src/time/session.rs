use anyhow::Context;
use chrono::{DateTime, Days, Local, NaiveDate};

const SECS_PER_DAY: i64 = 86_400;

/// Today's date in the user's local time zone; the date pickers start here.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` argument, falling back to `today`.
pub fn resolve_form_date(arg: Option<&str>, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(today),
    }
}

/// Unix-second request bounds for an inclusive `[start, end]` range of session dates.
///
/// Bars are stamped with the session open, which for exchanges east of UTC falls on the
/// previous UTC day. The window is widened by a day on each side and callers keep only
/// rows whose [`session_date`] is in range. No ordering check: an inverted range simply
/// selects nothing.
pub fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let midnight = |d: NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    };
    let period1 = start
        .checked_sub_days(Days::new(1))
        .map(midnight)
        .unwrap_or_else(|| midnight(start) - SECS_PER_DAY);
    let period2 = end
        .checked_add_days(Days::new(2))
        .map(midnight)
        .unwrap_or_else(|| midnight(end) + 2 * SECS_PER_DAY);
    (period1, period2)
}

/// Trading date of a bar stamped `ts`, in the exchange's local time (`gmtoffset` seconds).
pub fn session_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts.checked_add(gmtoffset)?, 0).map(|dt| dt.date_naive())
}
