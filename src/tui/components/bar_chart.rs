//! Horizontal contribution bars, one row per feature in display order.

use crate::tui::Theme;
use crate::viz::BarChartData;
use crate::viz::bar_chart::{ACTIVE_OPACITY, BAR_COLOR};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Feature names longer than this are cut
const NAME_WIDTH_MAX: u16 = 24;

/// Partial block glyphs, indexed by eighths of a cell
const EIGHTHS: [&str; 8] = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

pub struct ContributionChart<'a> {
    data: &'a BarChartData,
    theme: &'a Theme,
    offset: usize,
}

impl<'a> ContributionChart<'a> {
    pub fn new(data: &'a BarChartData, theme: &'a Theme) -> Self {
        Self {
            data,
            theme,
            offset: 0,
        }
    }

    /// Index of the first bar drawn
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// First bar to draw so the active one stays inside `height` rows
pub fn scroll_offset(len: usize, height: usize, active: Option<usize>) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    match active {
        Some(idx) if idx >= height => (idx + 1 - height).min(len - height),
        _ => 0,
    }
}

/// Bar index under a mouse position, for a chart drawn in `area` from `offset`
pub fn bar_at(area: Rect, offset: usize, len: usize, column: u16, row: u16) -> Option<usize> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    let idx = offset + (row - area.y) as usize;
    (idx < len).then_some(idx)
}

/// Block glyphs covering `ratio` of `width` cells
fn fill_cells(ratio: f64, width: u16) -> String {
    let eighths = (ratio.clamp(0.0, 1.0) * f64::from(width) * 8.0).round() as usize;
    let mut out = "█".repeat(eighths / 8);
    out.push_str(EIGHTHS[eighths % 8]);
    out
}

impl Widget for ContributionChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        if self.data.is_empty() {
            buf.set_string(area.x, area.y, "No contributions", self.theme.muted_style());
            return;
        }

        let name_width = self
            .data
            .bars
            .iter()
            .map(|b| b.feature.chars().count())
            .max()
            .unwrap_or(0)
            .min(NAME_WIDTH_MAX as usize) as u16;
        let label_width = self
            .data
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0) as u16;
        // marker, name, gap, bar, gap, label
        let bar_x = area.x + 2 + name_width + 1;
        let bar_width = area.width.saturating_sub(2 + name_width + 1 + 1 + label_width);
        let label_x = area.right().saturating_sub(label_width);

        for (row, bar) in self
            .data
            .bars
            .iter()
            .skip(self.offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + row as u16;
            let active = bar.opacity == ACTIVE_OPACITY;
            let text_style = if active {
                self.theme.normal_style().add_modifier(Modifier::BOLD)
            } else {
                self.theme.normal_style()
            };

            buf.set_string(area.x, y, if active { "▶ " } else { "  " }, text_style);
            buf.set_stringn(area.x + 2, y, &bar.feature, name_width as usize, text_style);

            let color: Color = BAR_COLOR.over(self.theme.chart_bg, bar.opacity).into();
            let fill = fill_cells(self.data.fill_ratio(bar), bar_width);
            buf.set_stringn(bar_x, y, fill, bar_width as usize, Style::default().fg(color));

            let label = format!("{:>width$}", bar.label, width = label_width as usize);
            buf.set_stringn(label_x, y, label, label_width as usize, text_style);
        }
    }
}
