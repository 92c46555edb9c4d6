//! Output generation modules for JSON, Markdown, and index files.
//!
//! This module contains submodules responsible for writing a finished
//! briefing to the various output formats:
//!
//! # Submodules
//!
//! - [`json`]: Writes `MarketBriefing` data to JSON files for API consumption
//! - [`markdown`]: Renders a `MarketBriefing` to a readable Markdown page
//! - [`indexes`]: Updates the master index listing every generated briefing
//!
//! The renderers consume plain data and never fetch anything themselves. A
//! briefing with failed sections still renders; missing history and missing
//! news each have a fixed fallback line, so one bad upstream call never
//! takes the page down.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── 2024-01-20/
//! │   ├── NVDA.json
//! │   └── AAPL.json
//!
//! markdown_output_dir/
//! ├── 2024-01-20_NVDA.md     # Full briefing page
//! └── briefings.md           # Master index
//! ```

pub mod indexes;
pub mod json;
pub mod markdown;
