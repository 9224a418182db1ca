//! Quote source adapter.
//!
//! Fetches the latest quote for a symbol and normalizes it into a [`Quote`]. Connection
//! failures, non-success responses and malformed payloads form one failure class,
//! [`FetchError`], which is logged and folded into `QuoteData::Unavailable` here: callers
//! of [`QuoteSource::fetch`] never see an error.
use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use ticker_common::{Quote, Result, TickerError};

/// CNBC quote web service returning JSON.
pub const DEFAULT_QUOTE_URL: &str =
    "https://quote.cnbc.com/quote-html-webservice/restQuote/symbolType/symbol";
/// Marker the provider puts in the change fields when the price did not move.
pub const UNCHANGED_MARKER: &str = "UNCH";

/// Uniform failure class of a quote fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body is not the expected JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document contains no quote for the symbol.
    #[error("no quote for {0}")]
    MissingQuote(String),

    /// A numeric field is absent or not a number.
    #[error("invalid {field}: {value:?}")]
    Parse {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },
}

/// Provider of the latest quote for a symbol.
pub trait QuoteSource: Send + Sync {
    /// Fetch `symbol`, stamping the result with `fetched_at`.
    ///
    /// Never fails: any problem yields an unavailable quote.
    fn fetch(&self, symbol: &str, fetched_at: NaiveDateTime) -> Quote;
}

/// Quote source backed by the CNBC quote service.
pub struct CnbcSource {
    client: Client,
    base_url: String,
}

impl CnbcSource {
    /// Create a source querying `base_url`, bounding every request by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("ticker_display/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TickerError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: String::from(base_url),
        })
    }

    fn try_fetch(&self, symbol: &str, fetched_at: NaiveDateTime) -> Result<Quote, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("symbols", symbol),
                ("requestMethod", "itv"),
                ("noform", "0"),
                ("partnerId", "2"),
                ("fund", "1"),
                ("exthrs", "1"),
                ("output", "json"),
                ("events", "1"),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text()?;
        parse_quote_body(symbol, &body, fetched_at)
    }
}

impl QuoteSource for CnbcSource {
    fn fetch(&self, symbol: &str, fetched_at: NaiveDateTime) -> Quote {
        match self.try_fetch(symbol, fetched_at) {
            Ok(quote) => {
                debug!("Fetched {:?}", quote);
                quote
            }
            Err(e) => {
                warn!("Quote for {} unavailable: {}", symbol, e);
                Quote::unavailable(symbol, fetched_at)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "FormattedQuoteResult")]
    result: FormattedQuoteResult,
}

#[derive(Debug, Deserialize)]
struct FormattedQuoteResult {
    #[serde(rename = "FormattedQuote", default)]
    quotes: OneOrMany,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<FormattedQuote>),
    One(FormattedQuote),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<FormattedQuote> {
        match self {
            OneOrMany::Many(quotes) => quotes,
            OneOrMany::One(quote) => vec![quote],
        }
    }
}

#[derive(Debug, Deserialize)]
struct FormattedQuote {
    symbol: Option<String>,
    last: Option<String>,
    change: Option<String>,
    change_pct: Option<String>,
}

/// Parse a provider response body into a quote for `symbol`.
pub fn parse_quote_body(
    symbol: &str,
    body: &str,
    fetched_at: NaiveDateTime,
) -> Result<Quote, FetchError> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)?;
    let quotes = envelope.result.quotes.into_vec();
    let raw = quotes
        .iter()
        .find(|q| {
            q.symbol
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
        })
        .ok_or_else(|| FetchError::MissingQuote(String::from(symbol)))?;

    let price = parse_number("last", raw.last.as_deref())?;
    let change = raw.change.as_deref().map(str::trim);
    let change_pct = raw.change_pct.as_deref().map(str::trim);

    if change == Some(UNCHANGED_MARKER) || change_pct == Some(UNCHANGED_MARKER) {
        return Ok(Quote::unchanged(symbol, price, fetched_at));
    }

    let change = parse_number("change", change)?;
    let percent = parse_number("change_pct", change_pct)?;
    Ok(Quote::available(symbol, price, change, percent, fetched_at))
}

/// Parse a provider number such as `1,234.50`, `+2.50` or `(+2.56%)`.
fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64, FetchError> {
    let raw = raw.ok_or(FetchError::Parse {
        field,
        value: String::new(),
    })?;
    let cleaned: String = raw
        .trim()
        .trim_matches(|c| matches!(c, '(' | ')' | '%' | '+'))
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FetchError::Parse {
            field,
            value: String::from(raw),
        }),
    }
}
