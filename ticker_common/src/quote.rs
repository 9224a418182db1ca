//! Latest observation of a tracked symbol.
//!
//! A `Quote` either carries a complete, self-consistent set of numbers or nothing at all:
//! a failed fetch is total for that symbol on that refresh. The all-or-nothing rule is
//! expressed by [`QuoteData`] rather than by reserved numeric values.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Numeric content of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteData {
    /// The provider answered and every field was parsed.
    Available {
        /// Last traded price.
        price: f64,
        /// Signed absolute change from the previous close.
        change: f64,
        /// Signed change from the previous close, in percent.
        percent_change: f64,
    },
    /// The fetch failed at some step; nothing is known for this refresh.
    Unavailable,
}

/// Latest observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker identifier, e.g. `AAPL`.
    pub symbol: String,
    /// Price data or the failure marker.
    pub data: QuoteData,
    /// Local time at which the fetch was started.
    pub fetched_at: NaiveDateTime,
}

impl Quote {
    /// Build an available quote from price and change.
    ///
    /// The percent change is derived from the previous close (`price - change`) when that
    /// is non-zero, and `provider_percent` is used otherwise.
    pub fn available(
        symbol: &str,
        price: f64,
        change: f64,
        provider_percent: f64,
        fetched_at: NaiveDateTime,
    ) -> Self {
        let percent_change = derive_percent_change(price, change).unwrap_or(provider_percent);
        Quote {
            symbol: String::from(symbol),
            data: QuoteData::Available {
                price,
                change,
                percent_change,
            },
            fetched_at,
        }
    }

    /// Build a quote for a symbol whose price did not move since the previous close.
    pub fn unchanged(symbol: &str, price: f64, fetched_at: NaiveDateTime) -> Self {
        Quote {
            symbol: String::from(symbol),
            data: QuoteData::Available {
                price,
                change: 0.0,
                percent_change: 0.0,
            },
            fetched_at,
        }
    }

    /// Build the failure quote for `symbol`.
    pub fn unavailable(symbol: &str, fetched_at: NaiveDateTime) -> Self {
        Quote {
            symbol: String::from(symbol),
            data: QuoteData::Unavailable,
            fetched_at,
        }
    }

    /// Returns `true` if the quote carries price data.
    pub fn is_available(&self) -> bool {
        matches!(self.data, QuoteData::Available { .. })
    }

    /// Previous close implied by price and change, if the quote is available.
    pub fn previous_close(&self) -> Option<f64> {
        match self.data {
            QuoteData::Available { price, change, .. } => Some(price - change),
            QuoteData::Unavailable => None,
        }
    }
}

/// Percent change implied by `price` and `change`, rounded to two decimals.
///
/// Returns `None` when the implied previous close is zero.
pub fn derive_percent_change(price: f64, change: f64) -> Option<f64> {
    let previous_close = price - change;
    if previous_close == 0.0 {
        return None;
    }
    Some(round_cents(change / previous_close * 100.0))
}

/// Round to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 17)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_percent_matches_previous_close() {
        let cases = [(100.0, 97.5), (250.0, 260.0), (1234.56, 1200.0), (0.5, 0.25)];
        for (price, previous_close) in cases {
            let quote = Quote::available("XYZ", price, price - previous_close, 0.0, at());
            let expected = round_cents((price - previous_close) / previous_close * 100.0);
            match quote.data {
                QuoteData::Available { percent_change, .. } => {
                    assert_eq!(percent_change, expected)
                }
                QuoteData::Unavailable => panic!("expected available quote"),
            }
        }
    }

    #[test]
    fn test_percent_of_scenario_quote() {
        assert_eq!(derive_percent_change(100.0, 2.5), Some(2.56));
    }

    #[test]
    fn test_zero_previous_close_uses_provider_percent() {
        let quote = Quote::available("XYZ", 5.0, 5.0, 12.5, at());
        assert_eq!(
            quote.data,
            QuoteData::Available {
                price: 5.0,
                change: 5.0,
                percent_change: 12.5
            }
        );
    }

    #[test]
    fn test_unavailable_has_no_numbers() {
        let quote = Quote::unavailable("XYZ", at());
        assert!(!quote.is_available());
        assert_eq!(quote.previous_close(), None);
    }

    #[test]
    fn test_unchanged_is_zero_change() {
        let quote = Quote::unchanged("XYZ", 42.0, at());
        assert_eq!(quote.previous_close(), Some(42.0));
        assert!(quote.is_available());
    }
}
