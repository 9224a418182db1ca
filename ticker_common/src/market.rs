//! Market session rule.
//!
//! The session is open Monday to Friday from 9:30 AM (inclusive) to 4:00 PM (exclusive)
//! on the caller's local clock. There is no holiday calendar.
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// First open hour of the session, as a fractional hour.
pub const OPEN_HOUR: f64 = 9.5;
/// First closed hour after the session, as a fractional hour.
pub const CLOSE_HOUR: f64 = 16.0;

/// Open/closed state shown on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Within the trading window.
    Open,
    /// Outside the trading window.
    Closed,
}

impl From<bool> for MarketStatus {
    fn from(open: bool) -> Self {
        if open {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        }
    }
}

/// Returns `true` if the market session is open at `now`.
pub fn is_open(now: &NaiveDateTime) -> bool {
    let weekday = now.weekday();
    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let hour = now.hour() as f64 + now.minute() as f64 / 60.0;
    (OPEN_HOUR..CLOSE_HOUR).contains(&hour)
}
