//! Command-line arguments for the ticker display.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::source::DEFAULT_QUOTE_URL;

/// Default refresh cadence in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 30;
/// Default upper bound for a single quote fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Where frames are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// Repaint the terminal with colored lines.
    Terminal,
    /// Print every snapshot as one JSON line.
    Json,
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Stock Ticker Display", long_about = None)]
pub struct Args {
    /// One or two ticker symbols, shown in the given order.
    #[arg(required = true, num_args = 1..=2, value_parser = parse_symbol)]
    pub symbols: Vec<String>,

    /// Refresh rate in seconds (min: 1).
    #[arg(
        long,
        default_value_t = DEFAULT_REFRESH_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub refresh: u64,

    /// Upper bound for a single quote fetch in seconds; never longer than the refresh rate.
    #[arg(
        long,
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout: u64,

    /// Output used to paint frames.
    #[arg(long, value_enum, default_value_t = OutputKind::Terminal)]
    pub output: OutputKind,

    /// Base URL of the quote service.
    #[arg(long, default_value = DEFAULT_QUOTE_URL)]
    pub quote_url: String,

    /// Command printing the device temperature, e.g. `temp=48.3'C`.
    #[arg(long, default_value = "vcgencmd measure_temp")]
    pub sensor_command: String,

    /// External address used to discover the outbound interface address.
    #[arg(long, default_value = "8.8.8.8:80")]
    pub probe_address: String,

    /// Paint the terminal without ANSI colors.
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Time between two refreshes.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh)
    }

    /// Per-fetch timeout, clamped to the refresh interval.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout.min(self.refresh))
    }
}

/// Trim and upper-case a symbol, rejecting empty input and characters that never
/// appear in a ticker.
fn parse_symbol(raw: &str) -> Result<String, String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(String::from("symbol must not be empty"));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(format!("{raw} is not a valid ticker symbol"));
    }
    Ok(symbol)
}
