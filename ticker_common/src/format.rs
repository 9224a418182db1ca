//! Presentation strings and colors.
//!
//! Everything here is a pure function of its input: formatting the same quote twice gives
//! the same text and color. Renderers consume a [`Frame`] and only decide how to paint it.
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::date_format::format_date;
use crate::market::MarketStatus;
use crate::quote::{Quote, QuoteData};
use crate::snapshot::DisplaySnapshot;

/// Text shown in every field of a quote that could not be fetched.
pub const ERROR_TEXT: &str = "ERROR";

/// Color of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ColorClass {
    /// Price went up.
    Positive,
    /// Price went down.
    Negative,
    /// Unchanged price or plain telemetry.
    Neutral,
    /// The quote is unavailable; painted like `Neutral`.
    Error,
}

impl ColorClass {
    /// Color class for a signed change. Neutral iff exactly zero.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            ColorClass::Positive
        } else if change < 0.0 {
            ColorClass::Negative
        } else {
            ColorClass::Neutral
        }
    }

    fn sign(self) -> &'static str {
        match self {
            ColorClass::Positive => "+",
            ColorClass::Negative => "-",
            ColorClass::Neutral | ColorClass::Error => "",
        }
    }
}

/// Display-ready fields of one quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteText {
    /// Price with currency sign, e.g. `$1,234.56`.
    pub price_text: String,
    /// Signed change with currency sign, e.g. `+$2.50`.
    pub change_text: String,
    /// Signed percent change, e.g. `+2.56%`.
    pub percent_text: String,
    /// Color of both lines.
    pub color: ColorClass,
}

impl QuoteText {
    /// First line for a quote: symbol and price.
    pub fn stock_line(&self, symbol: &str) -> String {
        format!("{}    {}", symbol, self.price_text)
    }

    /// Second line for a quote: change and percent change.
    pub fn change_line(&self) -> String {
        format!("{}   {}", self.change_text, self.percent_text)
    }
}

/// Map a quote to its display fields.
pub fn format_quote(quote: &Quote) -> QuoteText {
    match quote.data {
        QuoteData::Available {
            price,
            change,
            percent_change,
        } => {
            let color = ColorClass::from_change(change);
            QuoteText {
                price_text: format!("${}", group_thousands(price)),
                change_text: format!("{}${}", color.sign(), group_thousands(change)),
                percent_text: format!("{}{}%", color.sign(), group_thousands(percent_change)),
                color,
            }
        }
        QuoteData::Unavailable => QuoteText {
            price_text: String::from(ERROR_TEXT),
            change_text: String::from(ERROR_TEXT),
            percent_text: String::from(ERROR_TEXT),
            color: ColorClass::Error,
        },
    }
}

/// Absolute value with two fraction digits and comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}.{}", grouped, fraction)
}

/// One line of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameLine {
    /// Text to paint.
    pub text: String,
    /// Color to paint it in.
    pub color: ColorClass,
}

impl FrameLine {
    fn neutral(text: String) -> Self {
        FrameLine {
            text,
            color: ColorClass::Neutral,
        }
    }
}

/// Ordered lines of a whole snapshot, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Lines in paint order.
    pub lines: Vec<FrameLine>,
}

impl Frame {
    /// Lay out a snapshot: two lines per quote, then the telemetry that is present.
    ///
    /// Absent telemetry is omitted entirely rather than replaced by a placeholder.
    pub fn from_snapshot(snapshot: &DisplaySnapshot) -> Self {
        let mut lines = Vec::with_capacity(snapshot.quotes.len() * 2 + 4);

        for quote in &snapshot.quotes {
            let text = format_quote(quote);
            lines.push(FrameLine {
                text: text.stock_line(&quote.symbol),
                color: text.color,
            });
            lines.push(FrameLine {
                text: text.change_line(),
                color: text.color,
            });
        }

        if let Some(ip) = snapshot.ip_address {
            lines.push(FrameLine::neutral(format!("IP: {}", ip)));
        }
        if let Some(celsius) = snapshot.temperature_celsius {
            lines.push(FrameLine::neutral(format!("Temp: {:.1}°C", celsius)));
        }
        lines.push(FrameLine::neutral(format!(
            "Market: {}",
            MarketStatus::from(snapshot.market_open)
        )));
        lines.push(FrameLine::neutral(format!(
            "Updated: {}",
            format_date(&snapshot.as_of)
        )));

        Frame { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::net::{IpAddr, Ipv4Addr};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 22)
            .and_then(|d| d.and_hms_opt(15, 5, 0))
            .unwrap()
    }

    fn quote(price: f64, change: f64, percent_change: f64) -> Quote {
        Quote {
            symbol: String::from("XYZ"),
            data: QuoteData::Available {
                price,
                change,
                percent_change,
            },
            fetched_at: at(),
        }
    }

    #[test]
    fn test_positive_quote() {
        let text = format_quote(&quote(100.0, 2.5, 2.56));
        assert_eq!(text.stock_line("XYZ"), "XYZ    $100.00");
        assert_eq!(text.change_line(), "+$2.50   +2.56%");
        assert_eq!(text.color, ColorClass::Positive);
    }

    #[test]
    fn test_negative_quote() {
        let text = format_quote(&quote(1234.5, -15.25, -1.22));
        assert_eq!(text.price_text, "$1,234.50");
        assert_eq!(text.change_line(), "-$15.25   -1.22%");
        assert_eq!(text.color, ColorClass::Negative);
    }

    #[test]
    fn test_unchanged_quote_has_no_sign() {
        let text = format_quote(&Quote::unchanged("XYZ", 42.0, at()));
        assert_eq!(text.change_line(), "$0.00   0.00%");
        assert_eq!(text.color, ColorClass::Neutral);
    }

    #[test]
    fn test_unavailable_quote_is_error() {
        let text = format_quote(&Quote::unavailable("XYZ", at()));
        assert_eq!(text.stock_line("XYZ"), "XYZ    ERROR");
        assert_eq!(text.change_line(), "ERROR   ERROR");
        assert_eq!(text.color, ColorClass::Error);
    }

    #[test]
    fn test_formatting_is_repeatable() {
        let q = quote(99.99, -0.01, -0.01);
        assert_eq!(format_quote(&q), format_quote(&q));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(-1234567.891), "1,234,567.89");
        assert_eq!(group_thousands(100000.0), "100,000.00");
    }

    fn snapshot(temperature_celsius: Option<f64>) -> DisplaySnapshot {
        DisplaySnapshot {
            quotes: vec![quote(100.0, 2.5, 2.56), Quote::unavailable("ABC", at())],
            ip_address: Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
            temperature_celsius,
            market_open: true,
            as_of: at(),
        }
    }

    #[test]
    fn test_frame_layout() {
        let frame = Frame::from_snapshot(&snapshot(Some(48.3)));
        let texts: Vec<&str> = frame.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "XYZ    $100.00",
                "+$2.50   +2.56%",
                "ABC    ERROR",
                "ERROR   ERROR",
                "IP: 192.168.1.20",
                "Temp: 48.3°C",
                "Market: Open",
                "Updated: Monday, January 22nd 3:05 PM",
            ]
        );
        assert_eq!(frame.lines[2].color, ColorClass::Error);
    }

    #[test]
    fn test_frame_omits_missing_temperature() {
        let frame = Frame::from_snapshot(&snapshot(None));
        assert_eq!(frame.lines.len(), 7);
        assert!(frame.lines.iter().all(|l| !l.text.starts_with("Temp")));
    }
}
