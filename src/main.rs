//! # Market Brief
//!
//! A single-shot market briefing generator: fetches one stock's daily price
//! history and a fixed set of global market quotes, scrapes the latest
//! financial headlines, and writes the result as a Markdown page and a JSON
//! document.
//!
//! ## Features
//!
//! - Daily OHLC history with summary statistics for any Yahoo Finance symbol
//! - Market overview boards: major indices, FX pairs, commodities, crypto
//! - Bounded headline extraction from a configurable news page and selector
//! - JSON API files and Markdown documents, plus a master briefing index
//!
//! ## Usage
//!
//! ```sh
//! market_brief -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **History**: fetch the symbol's daily bars over the requested range
//! 2. **Boards**: fetch last closes for the fixed market-overview symbols
//! 3. **News**: extract up to `--max-headlines` headline/link pairs
//! 4. **Output**: write the JSON file, the Markdown page, and the index
//!
//! Every fetch step degrades gracefully: a failure is logged and rendered
//! as a fixed fallback line, never a crash.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod extractor;
mod markets;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use extractor::{ExtractionRequest, NewsExtractor};
use markets::{
    BoardEntry, COMMODITIES, CRYPTOS, CURRENCIES, INDICES, PriceSeriesProvider, QuerySpan,
    yahoo::YahooFinance,
};
use models::{MarketBriefing, QuoteRow, QuoteSection};
use utils::{ensure_writable_dir, normalize_symbol};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("market_brief starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.symbol, ?args.json_output_dir, ?args.markdown_output_dir, "Parsed CLI arguments");

    let symbol = normalize_symbol(&args.symbol)
        .ok_or_else(|| format!("`{}` does not look like a ticker symbol", args.symbol))?;
    let start_date = args.start_date;
    let end_date = args.end_date.unwrap_or_else(|| Local::now().date_naive());
    if end_date < start_date {
        return Err(format!("end date {end_date} precedes start date {start_date}").into());
    }

    // Early check: both output dirs must be writable before any fetching.
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let fetch_config = args.fetch_config();
    let provider = YahooFinance::new(&fetch_config)?;

    // ---- Symbol history ----
    let span = QuerySpan::Range {
        start: start_date,
        end: end_date,
    };
    let history = match provider.price_history(&symbol, &span).await {
        Ok(series) => {
            info!(symbol = %symbol, bars = series.bars.len(), "Fetched price history");
            Some(series)
        }
        Err(e) => {
            error!(symbol = %symbol, error = %e, "Failed to fetch price history");
            None
        }
    };
    let summary = history.as_ref().and_then(|series| series.summary());

    // ---- Market overview boards ----
    let mut sections = Vec::new();
    for (heading, entries) in [
        ("Indices", INDICES),
        ("Currency Exchange Rates", CURRENCIES),
        ("Commodities", COMMODITIES),
        ("Cryptocurrencies", CRYPTOS),
    ] {
        sections.push(fetch_board(&provider, heading, entries).await);
    }
    let quoted = sections
        .iter()
        .flat_map(|section| &section.rows)
        .filter(|row| row.price.is_some())
        .count();
    let total = sections.iter().map(|section| section.rows.len()).sum::<usize>();
    info!(quoted, total, "Fetched market overview boards");

    // ---- News ----
    let news_extractor = NewsExtractor::new(&fetch_config)?;
    let request = ExtractionRequest::new(&args.news_url, args.max_headlines, &args.news_selector)?;
    let headlines = match news_extractor.extract(&request).await {
        Ok(items) => {
            info!(count = items.len(), source = %args.news_url, "Extracted news headlines");
            Some(items)
        }
        Err(e) => {
            // Render the fallback line rather than dropping the section.
            error!(error = %e, source = %args.news_url, "News extraction failed");
            None
        }
    };

    // ---- Build briefing ----
    let briefing = MarketBriefing {
        local_date: Local::now().date_naive().to_string(),
        local_time: Local::now().format("%H:%M:%S").to_string(),
        symbol,
        start_date,
        end_date,
        history,
        summary,
        sections,
        headlines,
        events: models::upcoming_events(),
    };
    info!(
        symbol = %briefing.symbol,
        local_date = %briefing.local_date,
        local_time = %briefing.local_time,
        "Briefing assembled"
    );

    // ---- JSON output ----
    if let Err(e) = outputs::json::write_briefing(&briefing, &args.json_output_dir).await {
        error!(error = %e, "Failed to write briefing JSON");
    }

    // ---- Markdown output ----
    let markdown_filename = format!("{}_{}.md", briefing.local_date, briefing.symbol);
    let output_markdown_path = format!("{}/{}", args.markdown_output_dir, markdown_filename);
    let md = outputs::markdown::briefing_to_markdown(&briefing);

    info!(path = %output_markdown_path, "Writing Markdown");
    if let Err(e) = tokio::fs::write(&output_markdown_path, md).await {
        error!(path = %output_markdown_path, error = %e, "Failed writing Markdown");
    } else {
        info!(path = %output_markdown_path, "Wrote briefing Markdown");
    }

    // ---- Index update ----
    if let Err(e) =
        outputs::indexes::update_briefing_index(&args.markdown_output_dir, &briefing, &markdown_filename)
            .await
    {
        error!(error = %e, "Failed to update briefings.md index");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Fetch one board's last-close quotes, degrading failed rows to `None`.
///
/// Rows are fetched sequentially; the fixed boards are small and the shared
/// client reuses its connections across them.
#[instrument(level = "info", skip(provider, entries))]
async fn fetch_board<P: PriceSeriesProvider>(
    provider: &P,
    heading: &str,
    entries: &[BoardEntry],
) -> QuoteSection {
    let mut rows = Vec::with_capacity(entries.len());
    for &(label, symbol) in entries {
        let price = match provider.price_history(symbol, &QuerySpan::latest_day()).await {
            Ok(series) => series.last_close(),
            Err(e) => {
                warn!(symbol, error = %e, "Quote fetch failed; rendering n/a");
                None
            }
        };
        rows.push(QuoteRow {
            label: label.to_string(),
            symbol: symbol.to_string(),
            price,
        });
    }
    QuoteSection {
        heading: heading.to_string(),
        rows,
    }
}
