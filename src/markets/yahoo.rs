//! Yahoo Finance chart-API provider.
//!
//! Price history comes from the public v8 chart endpoint:
//! `https://query1.finance.yahoo.com/v8/finance/chart/{symbol}`, queried
//! with `interval=1d` and either an epoch-second `period1`/`period2` pair
//! (explicit date ranges) or a `range` lookback parameter. The payload
//! carries parallel arrays under `chart.result[0]`: `timestamp`,
//! `indicators.quote[0].{open,high,low,close,volume}`, and
//! `indicators.adjclose[0].adjclose`.
//!
//! Holiday and halted rows arrive as JSON nulls inside those arrays; such
//! rows are skipped rather than zero-filled. Symbols without an adjusted
//! series (FX pairs, crypto) omit the `adjclose` block entirely, in which
//! case the ordinary close stands in.

use super::{MarketDataError, PriceSeriesProvider, QuerySpan};
use crate::config::FetchConfig;
use crate::models::{PriceBar, PriceSeries};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Price-series provider backed by the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct YahooFinance {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooFinance {
    /// Build a provider with the given outbound options.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.build_client()?,
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
        })
    }

    #[cfg(test)]
    fn with_base_url(config: &FetchConfig, base_url: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.build_client()?,
            base_url,
        })
    }

    /// Chart URL for one symbol/span query.
    ///
    /// The symbol is percent-encoded into the path: index symbols carry `^`
    /// and futures carry `=`, neither of which belongs in a raw URL path.
    fn chart_url(&self, symbol: &str, span: &QuerySpan) -> Url {
        let mut url = self
            .base_url
            .join(&format!("/v8/finance/chart/{}", urlencoding::encode(symbol)))
            .unwrap();
        match span {
            QuerySpan::Range { start, end } => {
                let period1 = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
                // period2 is exclusive upstream; the extra day makes `end`
                // inclusive here.
                let period2 = end
                    .succ_opt()
                    .unwrap_or(*end)
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc()
                    .timestamp();
                url.query_pairs_mut()
                    .append_pair("period1", &period1.to_string())
                    .append_pair("period2", &period2.to_string())
                    .append_pair("interval", "1d")
                    .append_pair("events", "history");
            }
            QuerySpan::Lookback { period } => {
                url.query_pairs_mut()
                    .append_pair("range", period)
                    .append_pair("interval", "1d");
            }
        }
        url
    }
}

impl PriceSeriesProvider for YahooFinance {
    #[instrument(level = "info", skip(self))]
    async fn price_history(
        &self,
        symbol: &str,
        span: &QuerySpan,
    ) -> Result<PriceSeries, MarketDataError> {
        let url = self.chart_url(symbol, span);
        debug!(%url, "Requesting chart data");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| MarketDataError::Http {
                symbol: symbol.to_string(),
                source,
            })?;

        let envelope: ChartEnvelope =
            response.json().await.map_err(|source| {
                if source.is_decode() {
                    MarketDataError::BadPayload {
                        symbol: symbol.to_string(),
                        source,
                    }
                } else {
                    MarketDataError::Http {
                        symbol: symbol.to_string(),
                        source,
                    }
                }
            })?;

        series_from_chart(symbol, envelope)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

/// The `chart.error` block Yahoo fills for unknown or delisted symbols.
#[derive(Debug, Deserialize)]
struct ChartApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteArrays>,
    #[serde(default)]
    adjclose: Vec<AdjCloseArrays>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteArrays {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseArrays {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Convert a decoded chart payload into a [`PriceSeries`].
///
/// Kept free of I/O so fixture payloads can exercise the row handling:
/// rows with any missing field are dropped, and a missing adjclose block
/// falls back to the ordinary close.
pub(crate) fn series_from_chart(
    symbol: &str,
    envelope: ChartEnvelope,
) -> Result<PriceSeries, MarketDataError> {
    let unavailable = || MarketDataError::Unavailable {
        symbol: symbol.to_string(),
    };

    if let Some(error) = &envelope.chart.error {
        warn!(
            symbol,
            code = ?error.code,
            description = ?error.description,
            "Chart API returned an error"
        );
        return Err(unavailable());
    }

    let mut results = envelope.chart.result.ok_or_else(unavailable)?;
    if results.is_empty() {
        return Err(unavailable());
    }
    let result = results.remove(0);
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(unavailable)?;
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|block| block.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            debug!(symbol, %date, "Skipping incomplete chart row");
            continue;
        };
        let adj_close = adjclose.get(i).copied().flatten().unwrap_or(close);
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        });
    }

    if bars.is_empty() {
        return Err(unavailable());
    }
    debug!(symbol, bars = bars.len(), "Decoded price series");
    Ok(PriceSeries {
        symbol: symbol.to_string(),
        bars,
    })
}
