//! Table output formatting for CLI commands
//!
//! Renders cache statistics and scenario steps using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::CacheStats;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format cache counters as a two-column table
    pub fn format_stats(&self, stats: &CacheStats) -> String {
        let mut table = Self::create_base_table();
        table.set_header(vec![
            Cell::new("Counter").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("hits"), Cell::new(stats.hits)]);
        table.add_row(vec![Cell::new("misses"), Cell::new(stats.misses)]);
        table.add_row(vec![Cell::new("coalesced"), Cell::new(stats.coalesced)]);
        table.add_row(vec![
            Cell::new("hit ratio"),
            Cell::new(format!("{:.1}%", stats.hit_ratio() * 100.0)),
        ]);

        table.to_string()
    }

    /// Format rows of `(label, value)` pairs, e.g. a run summary
    pub fn format_summary(&self, rows: &[(&str, String)]) -> String {
        let mut table = Self::create_base_table();
        for (label, value) in rows {
            table.add_row(vec![
                Cell::new(label).add_attribute(Attribute::Bold),
                Cell::new(value),
            ]);
        }
        table.to_string()
    }

    /// Format one row per lookup with its outcome highlighted
    pub fn format_steps(&self, headers: &[&str], rows: &[Vec<String>], outcome_column: usize) -> String {
        let mut table = Self::create_base_table();
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );

        for row in rows {
            let cells = row.iter().enumerate().map(|(i, value)| {
                if i == outcome_column && self.use_colors {
                    Cell::new(value).fg(outcome_color(value))
                } else {
                    Cell::new(value)
                }
            });
            table.add_row(cells.collect::<Vec<_>>());
        }

        table.to_string()
    }

    fn create_base_table() -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

fn outcome_color(outcome: &str) -> Color {
    match outcome {
        "hit" => Color::Green,
        "coalesced" => Color::Cyan,
        "miss" => Color::Yellow,
        _ => Color::Red,
    }
}
