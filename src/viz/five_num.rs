use crate::core::{FiveNumSummary, FiveNumTable};
use serde::Serialize;

/// Column headers, in order
pub const HEADERS: [&str; 7] = ["Variable", "Min", "Q1", "Median", "Q3", "Max", "Missing"];

/// Shown across the five stat columns of a non-numeric row
pub const PLACEHOLDER: &str = "—";

/// The stat cells of a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowCells {
    /// min, q1, median, q3, max
    Stats([String; 5]),
    /// One placeholder spanning the five stat columns
    Spanning(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiveNumRow {
    pub variable: String,
    pub cells: RowCells,
    pub missing: String,
    /// Rendered bold with a left marker; values are unchanged
    pub is_target: bool,
}

/// One row per table entry, in the table's own order
pub fn rows(table: &FiveNumTable, target: Option<&str>) -> Vec<FiveNumRow> {
    table
        .iter()
        .map(|(variable, summary)| row(variable, summary, target == Some(variable)))
        .collect()
}

fn row(variable: &str, summary: &FiveNumSummary, is_target: bool) -> FiveNumRow {
    let cells = if summary.numeric {
        RowCells::Stats(summary.stats().map(format_stat))
    } else {
        RowCells::Spanning(PLACEHOLDER.to_string())
    };
    FiveNumRow {
        variable: variable.to_string(),
        cells,
        missing: summary.missing.to_string(),
        is_target,
    }
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => PLACEHOLDER.to_string(),
    }
}
