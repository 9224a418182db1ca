//! Everything needed to render one frame.
use std::net::IpAddr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::quote::Quote;

/// Immutable result of one refresh.
///
/// Built fresh on every tick and replaced, never mutated, by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Quotes in command-line symbol order.
    pub quotes: Vec<Quote>,
    /// Outbound address of the device, discovered once at startup.
    pub ip_address: Option<IpAddr>,
    /// Device temperature, when the sensor could be read.
    pub temperature_celsius: Option<f64>,
    /// Whether the market session is open at `as_of`.
    pub market_open: bool,
    /// Local time the refresh started.
    pub as_of: NaiveDateTime,
}
