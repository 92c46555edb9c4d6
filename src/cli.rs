//! Command-line interface definitions for Market Brief.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The defaults reproduce the briefing as shipped (NVDA over a range
//! starting 2024-01-01, five Yahoo Finance headlines), while every
//! site-specific or fragile detail, like the news page URL and the headline
//! selector, stays overridable per run.

use crate::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, FetchConfig};
use chrono::NaiveDate;
use clap::Parser;
use std::time::Duration;

/// Default source page for the financial-news section.
pub const DEFAULT_NEWS_URL: &str = "https://finance.yahoo.com/markets";

/// Default CSS selector for headline nodes on the Yahoo Finance markets
/// page.
///
/// The class is an atomic-CSS artifact and the most likely part of the
/// scrape to drift, which is exactly why it is a flag default rather than a
/// constant inside the extractor.
pub const DEFAULT_NEWS_SELECTOR: &str = r"h3.Mb\(5px\)";

/// Command-line arguments for the Market Brief application.
///
/// # Examples
///
/// ```sh
/// # Basic usage with required arguments
/// market_brief -j ./json -m ./markdown
///
/// # A different symbol and range
/// market_brief -j ./json -m ./markdown -s AAPL --start-date 2024-03-01
///
/// # Re-point the news scrape after a page redesign
/// market_brief -j ./json -m ./markdown --news-selector "h3.storyTitle"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Stock symbol to analyze (e.g. NVDA, AAPL)
    #[arg(short, long, default_value = "NVDA")]
    pub symbol: String,

    /// Start of the history range (YYYY-MM-DD)
    #[arg(long, default_value = "2024-01-01")]
    pub start_date: NaiveDate,

    /// End of the history range, inclusive (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Output directory for the JSON API file
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Output directory for the Markdown file
    #[arg(short, long)]
    pub markdown_output_dir: String,

    /// Page to scrape for the news section
    #[arg(long, default_value = DEFAULT_NEWS_URL)]
    pub news_url: String,

    /// CSS selector identifying headline nodes on the news page
    #[arg(long, default_value = DEFAULT_NEWS_SELECTOR)]
    pub news_selector: String,

    /// Maximum number of headlines to keep
    #[arg(long, default_value_t = 5)]
    pub max_headlines: usize,

    /// End-to-end timeout for each outbound request, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// User-Agent header for outbound requests
    #[arg(long, env = "MARKET_BRIEF_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Cli {
    /// The outbound-HTTP options these arguments describe.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}
