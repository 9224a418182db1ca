//! Error types shared by the workspace.
//!
//! `TickerError` covers the failures that are allowed to stop the program: startup
//! configuration problems, exhausting the address resolution retries, and I/O or
//! serialization errors surfaced by a renderer. Per-source failures (one quote, one
//! sensor read) never reach this type; they are folded into absent values where they
//! happen.
use std::io;

use thiserror::Error;

/// Unified error type for the ticker display.
#[derive(Error, Debug)]
pub enum TickerError {
    /// I/O error originating from the standard library or sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid startup configuration with a human-readable message.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The device address could not be discovered within the retry budget.
    #[error("Could not determine device IP address after {attempts} attempts")]
    AddressUnavailable {
        /// Number of attempts that were made.
        attempts: u32,
    },

    /// The operator asked to quit before startup finished.
    #[error("Interrupted by shutdown request")]
    Interrupted,

    /// Failure while encoding a snapshot to JSON.
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
