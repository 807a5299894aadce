//! Kanban board output

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::{json, table};
use crate::cli::OutputFormat;
use crate::client::models::Column;
use crate::error::Result;

/// Format board columns: one titled table per column, or a JSON array
pub fn format_board<T: Tabled + Serialize>(
    columns: &[Column<T>],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::format_json(columns)?),
        OutputFormat::Table => {
            if columns.is_empty() {
                return Ok("No results found.".to_string());
            }
            let sections: Vec<String> = columns
                .iter()
                .map(|column| {
                    let title =
                        format!("{} ({})", column_title(&column.status), column.items.len());
                    let body = if column.items.is_empty() {
                        "  (empty)".dimmed().to_string()
                    } else {
                        table::format_table(&column.items)
                    };
                    format!("{}\n{}", title.bold(), body)
                })
                .collect();
            Ok(sections.join("\n\n"))
        }
    }
}

pub fn print_board<T: Tabled + Serialize>(
    columns: &[Column<T>],
    format: OutputFormat,
) -> Result<()> {
    println!("{}", format_board(columns, format)?);
    Ok(())
}

fn column_title(status: &str) -> &str {
    if status.is_empty() { "(no status)" } else { status }
}
