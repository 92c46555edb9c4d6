//! Utility functions for symbol normalization, price formatting, and file
//! system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Ticker symbol validation before any network round trip
//! - Price formatting shared by the Markdown renderer
//! - String truncation for logging
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Ticker shapes the providers accept: plain stocks (`NVDA`, `BRK.B`),
/// indices (`^GSPC`), futures (`GC=F`), FX pairs (`USDJPY=X`), and crypto
/// (`BTC-USD`).
static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\^?[A-Z0-9][A-Z0-9.\-=]{0,14}$").unwrap());

/// Uppercase and validate a user-entered ticker symbol.
///
/// Returns `None` for anything that does not look like a ticker, so typos
/// and shell-quoting accidents fail before any request is issued.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_symbol("nvda"), Some("NVDA".to_string()));
/// assert_eq!(normalize_symbol("^gspc"), Some("^GSPC".to_string()));
/// assert_eq!(normalize_symbol("not a ticker"), None);
/// ```
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    SYMBOL_RE.is_match(&symbol).then_some(symbol)
}

/// Format an optional price for display.
///
/// Present prices render as `$123.45`; absent ones as `n/a`.
pub fn fmt_price(price: Option<f64>) -> String {
    match price {
        Some(value) => format!("${value:.2}"),
        None => "n/a".to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing up to the nearest
/// character boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol_accepts_common_shapes() {
        assert_eq!(normalize_symbol("NVDA"), Some("NVDA".to_string()));
        assert_eq!(normalize_symbol("nvda"), Some("NVDA".to_string()));
        assert_eq!(normalize_symbol(" aapl "), Some("AAPL".to_string()));
        assert_eq!(normalize_symbol("^GSPC"), Some("^GSPC".to_string()));
        assert_eq!(normalize_symbol("GC=F"), Some("GC=F".to_string()));
        assert_eq!(normalize_symbol("usdjpy=x"), Some("USDJPY=X".to_string()));
        assert_eq!(normalize_symbol("BTC-USD"), Some("BTC-USD".to_string()));
        assert_eq!(normalize_symbol("BRK.B"), Some("BRK.B".to_string()));
    }

    #[test]
    fn test_normalize_symbol_rejects_junk() {
        assert_eq!(normalize_symbol(""), None);
        assert_eq!(normalize_symbol("   "), None);
        assert_eq!(normalize_symbol("^"), None);
        assert_eq!(normalize_symbol("not a ticker"), None);
        assert_eq!(normalize_symbol("NVDA; rm -rf /"), None);
        assert_eq!(normalize_symbol("AVERYLONGSYMBOLNAMETHATGOESON"), None);
    }

    #[test]
    fn test_fmt_price() {
        assert_eq!(fmt_price(Some(123.456)), "$123.46");
        assert_eq!(fmt_price(Some(0.5)), "$0.50");
        assert_eq!(fmt_price(Some(6432.1)), "$6432.10");
        assert_eq!(fmt_price(None), "n/a");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // "é" is two bytes; a cut at byte 1 must back up instead of panicking.
        let s = "ééééé";
        let result = truncate_for_log(s, 1);
        assert!(result.ends_with("bytes)"));
    }
}
