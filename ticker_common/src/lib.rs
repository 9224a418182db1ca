//!
//! Pure building blocks of the ticker display.
//!
//! This crate aggregates:
//! - `error` — unified error type `TickerError` used across the workspace.
//! - `result` — handy `Result<T, TickerError>` alias.
//! - `quote` — the latest observation of one symbol, available or not.
//! - `snapshot` — everything needed to render one frame.
//! - `clock` — wall clock abstraction so timing logic can be driven by tests.
//! - `market` — market session open/closed rule.
//! - `date_format` — human readable timestamps with ordinal day suffixes.
//! - `format` — presentation strings, colors and frame layout.
//! - `retry` — bounded retry policy with a fixed delay.
#![warn(missing_docs)]
pub mod clock;
pub mod date_format;
pub mod error;
pub mod format;
pub mod market;
pub mod quote;
pub mod result;
pub mod retry;
pub mod snapshot;

pub use clock::{Clock, SystemClock};
pub use error::TickerError;
pub use quote::{Quote, QuoteData};
pub use result::Result;
pub use snapshot::DisplaySnapshot;
