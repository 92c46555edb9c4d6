//! Data models for the market briefing.
//!
//! This module defines the plain data structures the rendering layer
//! consumes:
//! - [`PriceBar`] / [`PriceSeries`]: date-indexed OHLC history for one symbol
//! - [`SeriesSummary`]: descriptive statistics over a series' closes
//! - [`QuoteRow`] / [`QuoteSection`]: the fixed market-overview boards
//! - [`EconomicEvent`]: calendar entries for the events section
//! - [`MarketBriefing`]: everything one run produces, handed to the renderers
//!
//! The models carry no fetching logic; that lives in `markets` and
//! `extractor`. The only behavior here is a handful of derived statistics.

use crate::extractor::HeadlineItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of OHLC price data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceBar {
    /// Trading date.
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Close adjusted for splits and dividends. Equal to `close` for
    /// instruments without an adjusted series (FX pairs, crypto).
    pub adj_close: f64,
    pub volume: u64,
}

/// A date-indexed price history for one symbol, bars in ascending date order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// The most recent closing price, if any bars exist.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    /// Descriptive statistics over the closing prices.
    ///
    /// Returns `None` for an empty series. The standard deviation is the
    /// sample deviation (`n - 1` denominator) and is `None` below two bars.
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = self.bars.first()?;
        let last = self.bars.last()?;

        let closes: Vec<f64> = self.bars.iter().map(|bar| bar.close).collect();
        let count = closes.len();
        let mean_close = closes.iter().sum::<f64>() / count as f64;
        let std_close = (count > 1).then(|| {
            let variance = closes
                .iter()
                .map(|close| (close - mean_close).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        });
        let min_close = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let max_close = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let change_pct = (first.close != 0.0)
            .then(|| (last.close - first.close) / first.close * 100.0);

        Some(SeriesSummary {
            count,
            mean_close,
            std_close,
            min_close,
            max_close,
            first_close: first.close,
            last_close: last.close,
            change_pct,
        })
    }
}

/// Descriptive statistics over one series' closing prices.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeriesSummary {
    /// Number of trading days in the series.
    pub count: usize,
    pub mean_close: f64,
    /// Sample standard deviation of the closes; `None` below two bars.
    pub std_close: Option<f64>,
    pub min_close: f64,
    pub max_close: f64,
    pub first_close: f64,
    pub last_close: f64,
    /// Percent change from first to last close; `None` when the first close
    /// is zero.
    pub change_pct: Option<f64>,
}

/// A single label/price line on one of the market-overview boards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoteRow {
    /// Display label, e.g. "S&P 500".
    pub label: String,
    /// Provider ticker symbol, e.g. "^GSPC".
    pub symbol: String,
    /// Latest close. `None` when the quote fetch failed; rendered as `n/a`.
    pub price: Option<f64>,
}

/// A titled group of quote rows (indices, currencies, commodities, crypto).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoteSection {
    pub heading: String,
    pub rows: Vec<QuoteRow>,
}

/// An entry in the upcoming-events calendar.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EconomicEvent {
    pub date: NaiveDate,
    pub event: String,
}

/// The static event calendar shipped with the briefing.
// TODO: replace with a real economic-calendar feed once a free source is chosen.
pub fn upcoming_events() -> Vec<EconomicEvent> {
    [
        (2024, 1, 15, "US Retail Sales"),
        (2024, 1, 18, "ECB Interest Rate Decision"),
        (2024, 1, 24, "Japan CPI Release"),
    ]
    .into_iter()
    .map(|(year, month, day, event)| EconomicEvent {
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        event: event.to_string(),
    })
    .collect()
}

/// Everything one run produces, serialized as-is to the JSON output.
///
/// `headlines` keeps the two news outcomes apart for the renderers: `None`
/// means extraction failed (render the fixed unavailable line), while
/// `Some(vec![])` means the page fetched fine but no headline survived
/// (render an empty-list note).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketBriefing {
    /// The date of generation in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local wall-clock time of generation in `HH:MM:SS` format.
    pub local_time: String,
    /// The analyzed ticker symbol, normalized to uppercase.
    pub symbol: String,
    /// Start of the requested history range.
    pub start_date: NaiveDate,
    /// End of the requested history range, inclusive.
    pub end_date: NaiveDate,
    /// Historical series for `symbol`; `None` when the provider failed.
    pub history: Option<PriceSeries>,
    /// Statistics over `history`; `None` when the history is missing or empty.
    pub summary: Option<SeriesSummary>,
    /// The market-overview boards, in display order.
    pub sections: Vec<QuoteSection>,
    /// Extracted headlines; see the type-level docs for the `None` vs
    /// `Some(vec![])` distinction.
    pub headlines: Option<Vec<HeadlineItem>>,
    /// Upcoming-events calendar entries.
    pub events: Vec<EconomicEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_summary_over_known_closes() {
        let series = PriceSeries {
            symbol: "NVDA".to_string(),
            bars: vec![
                bar("2024-01-02", 1.0),
                bar("2024-01-03", 2.0),
                bar("2024-01-04", 3.0),
                bar("2024-01-05", 4.0),
            ],
        };
        let summary = series.summary().unwrap();
        assert_eq!(summary.count, 4);
        assert!((summary.mean_close - 2.5).abs() < 1e-12);
        // Sample variance of 1,2,3,4 is 5/3.
        let expected_std = (5.0_f64 / 3.0).sqrt();
        assert!((summary.std_close.unwrap() - expected_std).abs() < 1e-12);
        assert_eq!(summary.min_close, 1.0);
        assert_eq!(summary.max_close, 4.0);
        assert_eq!(summary.first_close, 1.0);
        assert_eq!(summary.last_close, 4.0);
        assert!((summary.change_pct.unwrap() - 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_empty_series_is_none() {
        let series = PriceSeries {
            symbol: "NVDA".to_string(),
            bars: vec![],
        };
        assert!(series.summary().is_none());
        assert!(series.last_close().is_none());
    }

    #[test]
    fn test_single_bar_has_no_std() {
        let series = PriceSeries {
            symbol: "NVDA".to_string(),
            bars: vec![bar("2024-01-02", 10.0)],
        };
        let summary = series.summary().unwrap();
        assert_eq!(summary.count, 1);
        assert!(summary.std_close.is_none());
        assert_eq!(series.last_close(), Some(10.0));
    }

    #[test]
    fn test_upcoming_events_are_dated() {
        let events = upcoming_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event, "US Retail Sales");
        assert_eq!(events[0].date.to_string(), "2024-01-15");
    }

    #[test]
    fn test_briefing_round_trips_through_json() {
        let briefing = MarketBriefing {
            local_date: "2024-01-20".to_string(),
            local_time: "09:30:00".to_string(),
            symbol: "NVDA".to_string(),
            start_date: "2024-01-01".parse().unwrap(),
            end_date: "2024-01-19".parse().unwrap(),
            history: Some(PriceSeries {
                symbol: "NVDA".to_string(),
                bars: vec![bar("2024-01-02", 10.0), bar("2024-01-03", 20.0)],
            }),
            summary: None,
            sections: vec![QuoteSection {
                heading: "Indices".to_string(),
                rows: vec![QuoteRow {
                    label: "S&P 500".to_string(),
                    symbol: "^GSPC".to_string(),
                    price: Some(6400.0),
                }],
            }],
            headlines: Some(vec![HeadlineItem {
                title: "Markets rally".to_string(),
                link: Url::parse("https://finance.example.com/news/rally").unwrap(),
            }]),
            events: upcoming_events(),
        };

        let json = serde_json::to_string(&briefing).unwrap();
        let parsed: MarketBriefing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, briefing);
    }
}
