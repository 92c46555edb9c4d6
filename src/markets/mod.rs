//! Market data providers and the fixed market-overview boards.
//!
//! The briefing needs exactly one capability from the outside market-data
//! world: given a ticker symbol and a time span, return a date-indexed
//! OHLC series or say why it cannot. [`PriceSeriesProvider`] is that seam;
//! the one shipped implementation is [`yahoo::YahooFinance`].
//!
//! # Boards
//!
//! The market overview renders four fixed groups of symbols:
//!
//! | Board | Symbols |
//! |-------|---------|
//! | Indices | `^GSPC`, `^DJI`, `^IXIC`, `^FTSE`, `^N225`, `^HSI` |
//! | Currencies | `USDJPY=X`, `EURUSD=X`, `GBPUSD=X` |
//! | Commodities | `GC=F`, `SI=F`, `CL=F` |
//! | Cryptocurrencies | `BTC-USD`, `ETH-USD`, `ADA-USD` |
//!
//! Board quotes are the last close of a one-day lookback query against the
//! same provider that serves the historical series.

pub mod yahoo;

use crate::models::PriceSeries;
use chrono::NaiveDate;
use thiserror::Error;

/// A display label and provider symbol for one board row.
pub type BoardEntry = (&'static str, &'static str);

/// Major stock indices shown in the market overview.
pub const INDICES: &[BoardEntry] = &[
    ("S&P 500", "^GSPC"),
    ("Dow Jones", "^DJI"),
    ("Nasdaq", "^IXIC"),
    ("FTSE 100", "^FTSE"),
    ("Nikkei 225", "^N225"),
    ("Hang Seng", "^HSI"),
];

/// Currency pairs, labelled without the provider's `=X` suffix.
pub const CURRENCIES: &[BoardEntry] = &[
    ("USDJPY", "USDJPY=X"),
    ("EURUSD", "EURUSD=X"),
    ("GBPUSD", "GBPUSD=X"),
];

/// Commodity futures.
pub const COMMODITIES: &[BoardEntry] = &[
    ("Gold", "GC=F"),
    ("Silver", "SI=F"),
    ("Crude Oil", "CL=F"),
];

/// Cryptocurrencies, labelled without the `-USD` suffix.
pub const CRYPTOS: &[BoardEntry] = &[
    ("BTC", "BTC-USD"),
    ("ETH", "ETH-USD"),
    ("ADA", "ADA-USD"),
];

/// The span of history a price query asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpan {
    /// An explicit date range, both endpoints inclusive.
    Range { start: NaiveDate, end: NaiveDate },
    /// A provider-interpreted lookback window such as `1d` or `5d`.
    Lookback { period: &'static str },
}

impl QuerySpan {
    /// The one-day lookback used for board quotes.
    pub fn latest_day() -> Self {
        QuerySpan::Lookback { period: "1d" }
    }
}

/// Why a price query produced no series.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The HTTP round trip failed: connection error, timeout, or a
    /// non-success status.
    #[error("price request for {symbol} failed")]
    Http {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered but had no data for this symbol and span.
    #[error("no price data available for {symbol}")]
    Unavailable { symbol: String },
    /// The provider's payload did not decode as the expected chart shape.
    #[error("malformed chart payload for {symbol}")]
    BadPayload {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The single capability the briefing needs from a market-data source.
pub trait PriceSeriesProvider {
    /// Fetch the OHLC history for `symbol` over `span`.
    ///
    /// Bars come back in ascending date order. A provider answer with no
    /// usable rows is reported as [`MarketDataError::Unavailable`], never
    /// as an empty series.
    async fn price_history(
        &self,
        symbol: &str,
        span: &QuerySpan,
    ) -> Result<PriceSeries, MarketDataError>;
}
