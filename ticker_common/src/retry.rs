//! Bounded retry with a fixed delay between attempts.
use std::time::Duration;

use crate::clock::Clock;

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed; holds the last error.
    Exhausted(E),
    /// The stop condition fired before an attempt succeeded.
    Stopped,
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with a fixed delay.
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number. The delay is taken from `clock` after
    /// each failed attempt except the last one. On exhaustion the last error is returned.
    pub fn run<T, E, F>(&self, clock: &dyn Clock, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => return Err(e),
                Err(_) => {
                    clock.sleep(self.delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`RetryPolicy::run`], but gives up as soon as `stop` returns `true`.
    ///
    /// `stop` is checked before every attempt, so a stop raised during a delay is
    /// honored once that delay ends.
    pub fn run_until<T, E, F, S>(
        &self,
        clock: &dyn Clock,
        stop: S,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Result<T, E>,
        S: Fn() -> bool,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            if stop() {
                return Err(RetryError::Stopped);
            }
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => return Err(RetryError::Exhausted(e)),
                Err(_) => {
                    clock.sleep(self.delay);
                    attempt += 1;
                }
            }
        }
    }
}
