//! Markdown rendering of the briefing page.
//!
//! Section order mirrors the dashboard layout: the symbol's price history
//! and summary first, then the global market boards, the news headlines,
//! and the events calendar.
//!
//! Rendering is pure string building; the caller decides where the page is
//! written. Every fallible section has a fixed fallback line so the page is
//! complete even when an upstream fetch failed.

use crate::models::MarketBriefing;
use crate::utils::fmt_price;
use itertools::Itertools;
use std::fmt::Write;

/// How many of the most recent bars the closing-price table shows.
const RECENT_BARS: usize = 15;

/// Render a briefing to a complete Markdown page.
pub fn briefing_to_markdown(briefing: &MarketBriefing) -> String {
    let mut md = String::new();

    writeln!(md, "# {} Stock Analysis", briefing.symbol).unwrap();
    writeln!(md).unwrap();
    writeln!(
        md,
        "_Generated {} {} for {} to {}_",
        briefing.local_date, briefing.local_time, briefing.start_date, briefing.end_date
    )
    .unwrap();
    writeln!(md).unwrap();

    render_history(&mut md, briefing);
    render_boards(&mut md, briefing);
    render_news(&mut md, briefing);
    render_events(&mut md, briefing);

    md
}

fn render_history(md: &mut String, briefing: &MarketBriefing) {
    writeln!(md, "## Closing Prices").unwrap();
    writeln!(md).unwrap();

    let Some(history) = briefing.history.as_ref().filter(|h| !h.bars.is_empty()) else {
        // The dashboard's wording for a failed history fetch.
        writeln!(md, "Failed to fetch historical data for this stock.").unwrap();
        writeln!(md).unwrap();
        return;
    };

    let skipped = history.bars.len().saturating_sub(RECENT_BARS);
    let recent = &history.bars[skipped..];
    if skipped > 0 {
        writeln!(
            md,
            "Last {} of {} trading days:",
            recent.len(),
            history.bars.len()
        )
        .unwrap();
        writeln!(md).unwrap();
    }

    writeln!(md, "| Date | Open | High | Low | Close | Volume |").unwrap();
    writeln!(md, "|------|------|------|-----|-------|--------|").unwrap();
    for bar in recent {
        writeln!(
            md,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {} |",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
    writeln!(md).unwrap();

    if let Some(summary) = &briefing.summary {
        writeln!(md, "### Price Summary").unwrap();
        writeln!(md).unwrap();
        writeln!(md, "- Trading days: {}", summary.count).unwrap();
        writeln!(md, "- Mean close: {}", fmt_price(Some(summary.mean_close))).unwrap();
        writeln!(md, "- Std dev: {}", fmt_price(summary.std_close)).unwrap();
        writeln!(md, "- Min close: {}", fmt_price(Some(summary.min_close))).unwrap();
        writeln!(md, "- Max close: {}", fmt_price(Some(summary.max_close))).unwrap();
        match summary.change_pct {
            Some(pct) => writeln!(md, "- Change over range: {pct:+.2}%").unwrap(),
            None => writeln!(md, "- Change over range: n/a").unwrap(),
        }
        writeln!(md).unwrap();
    }
}

fn render_boards(md: &mut String, briefing: &MarketBriefing) {
    writeln!(md, "## Global Markets Overview").unwrap();
    writeln!(md).unwrap();
    for section in &briefing.sections {
        writeln!(md, "### {}", section.heading).unwrap();
        writeln!(md).unwrap();
        let rows = section
            .rows
            .iter()
            .map(|row| {
                format!(
                    "- **{}** (`{}`): {}",
                    row.label,
                    row.symbol,
                    fmt_price(row.price)
                )
            })
            .join("\n");
        writeln!(md, "{rows}").unwrap();
        writeln!(md).unwrap();
    }
}

fn render_news(md: &mut String, briefing: &MarketBriefing) {
    writeln!(md, "## Latest Financial News").unwrap();
    writeln!(md).unwrap();
    match &briefing.headlines {
        // Extraction failed entirely; the dashboard's fixed wording.
        None => writeln!(md, "Failed to fetch news.").unwrap(),
        // Fetched fine, nothing matched. Distinct from failure on purpose.
        Some(items) if items.is_empty() => {
            writeln!(md, "No headlines matched today.").unwrap();
        }
        Some(items) => {
            for item in items {
                writeln!(md, "- [{}]({})", item.title, item.link).unwrap();
            }
        }
    }
    writeln!(md).unwrap();
}

fn render_events(md: &mut String, briefing: &MarketBriefing) {
    writeln!(md, "## Upcoming Economic Events").unwrap();
    writeln!(md).unwrap();
    for event in &briefing.events {
        writeln!(md, "- {}: {}", event.date, event.event).unwrap();
    }
}
