//! JSON output generation for the API.
//!
//! This module serializes a finished briefing to JSON for consumption by
//! external clients.
//!
//! # Output Structure
//!
//! Files are organized by date, one file per analyzed symbol:
//! ```text
//! json_output_dir/
//! └── 2024-01-20/
//!     ├── NVDA.json
//!     └── AAPL.json
//! ```
//!
//! Re-running the same symbol on the same day overwrites its file; runs for
//! different symbols sit side by side.

use crate::models::MarketBriefing;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`MarketBriefing`] to a JSON file with date-based directory
/// structure.
///
/// Creates the necessary directory structure and writes the serialized
/// briefing to `{json_output_dir}/{date}/{SYMBOL}.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, symbol = %briefing.symbol))]
pub async fn write_briefing(
    briefing: &MarketBriefing,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(briefing)?;

    let dated_dir = format!("{}/{}", json_output_dir, briefing.local_date);
    info!(%dated_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&dated_dir).await {
        error!(%dated_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_path = format!("{}/{}.json", dated_dir, briefing.symbol);
    fs::write(&output_path, json).await?;
    info!(path = %output_path, "Wrote JSON API file");

    Ok(())
}
