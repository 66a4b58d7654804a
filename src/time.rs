//! Clock-style formatting of epoch offsets.
//!
//! Times throughout the crate are milliseconds from the schedule epoch.
//! Messages show them as `H:MM` so a violation reads like
//! "ends at 1:15 but starts at 1:00".

/// Milliseconds in one minute.
pub const MINUTE_MS: i64 = 60_000;
/// Milliseconds in one hour.
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Converts whole minutes to milliseconds.
#[inline]
pub const fn minutes(m: i64) -> i64 {
    m * MINUTE_MS
}

/// Converts whole hours to milliseconds.
#[inline]
pub const fn hours(h: i64) -> i64 {
    h * HOUR_MS
}

/// Formats an offset as `H:MM`, truncating seconds.
///
/// Negative offsets (possible for negative lags) get a leading `-`.
pub fn format_clock(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let total_minutes = ms.unsigned_abs() / MINUTE_MS as u64;
    format!("{sign}{}:{:02}", total_minutes / 60, total_minutes % 60)
}
