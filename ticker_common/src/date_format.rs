//! Human readable timestamps, e.g. `Monday, January 21st 3:05 PM`.
use chrono::{Datelike, NaiveDateTime};

/// English ordinal suffix for a day of month.
///
/// Days 4-20 and 24-30 take `th`; every other day is keyed by its last digit, so 31 is
/// `st` like 1 and 21.
pub fn day_suffix(day: u32) -> &'static str {
    if (4..=20).contains(&day) || (24..=30).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Format `now` as weekday, month, ordinal day and 12-hour time.
pub fn format_date(now: &NaiveDateTime) -> String {
    let day = now.day();
    format!(
        "{} {}{} {}",
        now.format("%A, %B"),
        day,
        day_suffix(day),
        now.format("%-I:%M %p")
    )
}
