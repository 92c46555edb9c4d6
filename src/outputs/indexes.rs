//! Master index management for the Markdown output.
//!
//! This module maintains `briefings.md`, the index listing every briefing
//! ever generated into a given output directory. Entries are grouped by
//! date with nested symbol links:
//!
//! ```text
//! # Market Briefings
//!
//! - **2024-01-21**
//!     - [NVDA](./2024-01-21_NVDA.md)
//! - **2024-01-20**
//!     - [NVDA](./2024-01-20_NVDA.md)
//!     - [AAPL](./2024-01-20_AAPL.md)
//! ```
//!
//! # Append vs Replace
//!
//! The index accumulates across runs. Re-running the same symbol on the
//! same day overwrites the page file, so the existing entry is kept rather
//! than duplicated.

use crate::models::MarketBriefing;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Update the `briefings.md` master index file.
///
/// Adds this run's page under its date heading, creating the file, the
/// heading, or both when they do not exist yet. New dates are inserted at
/// the top so the index reads newest-first.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, date = %briefing.local_date, file = %markdown_filename))]
pub async fn update_briefing_index(
    markdown_output_dir: &str,
    briefing: &MarketBriefing,
    markdown_filename: &str,
) -> Result<(), Box<dyn Error>> {
    let index_path = format!("{}/briefings.md", markdown_output_dir);
    let mut content = String::new();

    if Path::new(&index_path).exists() {
        content = fs::read_to_string(&index_path).await?;
    } else {
        content.push_str("# Market Briefings\n\n");
    }

    let date_heading = format!("- **{}**", briefing.local_date);
    let symbol_entry = format!("    - [{}](./{})", briefing.symbol, markdown_filename);

    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    let mut inserted = false;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim() == date_heading.trim() {
            let mut j = i + 1;
            let mut found_entry = false;
            while j < lines.len() && lines[j].starts_with("    - ") {
                if lines[j].trim() == symbol_entry.trim() {
                    found_entry = true;
                    break;
                }
                j += 1;
            }
            if !found_entry {
                lines.insert(j, symbol_entry.clone());
            }
            inserted = true;
            break;
        }
        i += 1;
    }

    if !inserted {
        if let Some(pos) = lines.iter().position(|l| l.starts_with("# Market Briefings")) {
            let insert_at = pos + 1;
            lines.insert(insert_at, "".to_string());
            lines.insert(insert_at + 1, date_heading.clone());
            lines.insert(insert_at + 2, symbol_entry.clone());
        } else {
            lines.push(date_heading.clone());
            lines.push(symbol_entry.clone());
        }
    }

    fs::write(&index_path, lines.join("\n")).await?;
    info!(path = %index_path, "Updated briefings.md index");
    Ok(())
}
