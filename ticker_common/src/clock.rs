//! Wall clock abstraction.
//!
//! Everything time-dependent (market hours, the "Updated" line, retry delays) goes through
//! [`Clock`], so tests can pin the time and skip real sleeps.
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};

/// Source of local time and of blocking delays.
pub trait Clock: Send + Sync {
    /// Current local time. The local clock is authoritative; no timezone conversion.
    fn now(&self) -> NaiveDateTime;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
