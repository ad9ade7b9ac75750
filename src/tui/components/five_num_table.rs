//! Five-number summary table.
//!
//! Drawn cell by cell instead of with `Table` so a non-numeric row can
//! span its placeholder across the five stat columns.

use crate::tui::Theme;
use crate::viz::five_num::{FiveNumRow, HEADERS, RowCells};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::Widget,
};

const VARIABLE_WIDTH_MAX: u16 = 24;
const STAT_WIDTH: u16 = 9;
const MISSING_WIDTH: u16 = 8;
const TARGET_MARKER: &str = "▸ ";

pub struct FiveNumTableWidget<'a> {
    rows: &'a [FiveNumRow],
    theme: &'a Theme,
}

impl<'a> FiveNumTableWidget<'a> {
    pub fn new(rows: &'a [FiveNumRow], theme: &'a Theme) -> Self {
        Self { rows, theme }
    }

    /// x/width of the seven columns inside `area`
    fn columns(&self, area: Rect) -> Vec<Rect> {
        let variable_width = self
            .rows
            .iter()
            .map(|r| r.variable.chars().count() + TARGET_MARKER.chars().count())
            .chain(std::iter::once(HEADERS[0].len()))
            .max()
            .unwrap_or(0)
            .min(VARIABLE_WIDTH_MAX as usize) as u16;
        let mut constraints = vec![Constraint::Length(variable_width)];
        constraints.extend([Constraint::Length(STAT_WIDTH); 5]);
        constraints.push(Constraint::Length(MISSING_WIDTH));
        Layout::horizontal(constraints)
            .spacing(1)
            .split(Rect { height: 1, ..area })
            .to_vec()
    }
}

fn right_aligned(buf: &mut Buffer, cell: Rect, y: u16, text: &str, style: ratatui::style::Style) {
    let width = cell.width as usize;
    buf.set_stringn(cell.x, y, format!("{text:>width$}"), width, style);
}

impl Widget for FiveNumTableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        if self.rows.is_empty() {
            buf.set_string(area.x, area.y, "No summary statistics", self.theme.muted_style());
            return;
        }

        let columns = self.columns(area);
        let header_style = self.theme.header_style();
        buf.set_style(Rect { height: 1, ..area }, header_style);
        for (idx, (header, cell)) in HEADERS.iter().zip(columns.iter()).enumerate() {
            if idx == 0 {
                buf.set_stringn(cell.x, area.y, header, cell.width as usize, header_style);
            } else {
                right_aligned(buf, *cell, area.y, header, header_style);
            }
        }

        let body = area.height.saturating_sub(1) as usize;
        for (i, row) in self.rows.iter().take(body).enumerate() {
            let y = area.y + 1 + i as u16;
            let style = if row.is_target {
                self.theme.target_row_style()
            } else if i % 2 == 1 {
                self.theme.alt_row_style()
            } else {
                self.theme.normal_style()
            };
            buf.set_style(Rect::new(area.x, y, area.width, 1), style);

            let variable = format!(
                "{}{}",
                if row.is_target { TARGET_MARKER } else { "  " },
                row.variable
            );
            buf.set_stringn(columns[0].x, y, variable, columns[0].width as usize, style);

            match &row.cells {
                RowCells::Stats(stats) => {
                    for (stat, cell) in stats.iter().zip(&columns[1..6]) {
                        right_aligned(buf, *cell, y, stat, style);
                    }
                }
                RowCells::Spanning(placeholder) => {
                    let span = columns[1].union(columns[5]);
                    let width = span.width as usize;
                    buf.set_stringn(span.x, y, format!("{placeholder:^width$}"), width, style);
                }
            }
            right_aligned(buf, columns[6], y, &row.missing, style);
        }
    }
}
