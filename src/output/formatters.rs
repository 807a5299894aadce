//! Reusable formatting utilities for CLI output
//!
//! Common formatting for dates, durations and progress values used across
//! multiple commands.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

/// Width of the text progress bar, in cells
const PROGRESS_CELLS: usize = 10;

/// Format a date or timestamp as `YYYY-MM-DD`.
///
/// Returns "--" for empty input and the input unchanged if it cannot be
/// parsed.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "--".to_string();
    }
    if let Ok(dt) = value.parse::<DateTime<Utc>>() {
        return dt.format("%Y-%m-%d").to_string();
    }
    // Naive timestamps and plain dates share the date prefix
    match value.get(..10) {
        Some(prefix) if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() => {
            prefix.to_string()
        }
        _ => value.to_string(),
    }
}

/// Format a duration as a short human-readable string.
///
/// # Example output
/// - `2h 15m 30s` (hours, minutes, seconds)
/// - `5m 10s` (minutes, seconds)
/// - `45s` (seconds only)
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Render a percentage as a fixed-width bar, e.g. `█████░░░░░ 50%`
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * PROGRESS_CELLS / 100;
    format!(
        "{}{} {}%",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled),
        percent
    )
}

/// Format an optional day count as `12d`
pub fn format_days(days: Option<i64>) -> String {
    match days {
        Some(d) => format!("{}d", d),
        None => "--".to_string(),
    }
}

/// Show an optional value, or `--`
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "--".to_string(),
    }
}
