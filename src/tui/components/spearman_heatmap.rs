//! Spearman correlation heatmap.

use crate::tui::Theme;
use crate::viz::{HeatmapGrid, Rgb};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Columns per cell, including one of padding
const CELL_WIDTH: u16 = 7;
const LABEL_WIDTH_MAX: u16 = 14;

pub struct HeatmapWidget<'a> {
    grid: Option<&'a HeatmapGrid>,
    theme: &'a Theme,
}

impl<'a> HeatmapWidget<'a> {
    /// `None` draws the placeholder for a missing or malformed matrix
    pub fn new(grid: Option<&'a HeatmapGrid>, theme: &'a Theme) -> Self {
        Self { grid, theme }
    }
}

/// Black or white, whichever reads better on `bg`
fn text_color(bg: Rgb) -> Color {
    let luma = 0.299 * f64::from(bg.0) + 0.587 * f64::from(bg.1) + 0.114 * f64::from(bg.2);
    if luma > 140.0 { Color::Black } else { Color::White }
}

impl Widget for HeatmapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let Some(grid) = self.grid else {
            buf.set_string(
                area.x,
                area.y,
                "Correlation matrix unavailable",
                self.theme.muted_style(),
            );
            return;
        };

        let label_width = grid
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .min(LABEL_WIDTH_MAX as usize) as u16;
        let grid_x = area.x + label_width + 1;
        let visible_cols = (area.right().saturating_sub(grid_x) / CELL_WIDTH) as usize;
        let visible_rows = area.height.saturating_sub(1) as usize;
        let header_style = self.theme.header_style();

        for (j, label) in grid.labels.iter().take(visible_cols).enumerate() {
            let x = grid_x + j as u16 * CELL_WIDTH;
            buf.set_stringn(x, area.y, label, (CELL_WIDTH - 1) as usize, header_style);
        }

        for (i, (label, row)) in grid
            .labels
            .iter()
            .zip(&grid.cells)
            .take(visible_rows)
            .enumerate()
        {
            let y = area.y + 1 + i as u16;
            buf.set_stringn(area.x, y, label, label_width as usize, header_style);
            for (j, cell) in row.iter().take(visible_cols).enumerate() {
                let x = grid_x + j as u16 * CELL_WIDTH;
                let bg = cell.color();
                let style = Style::default().bg(bg.into()).fg(text_color(bg));
                let text = format!("{:^width$}", cell.label, width = (CELL_WIDTH - 1) as usize);
                buf.set_stringn(x, y, text, (CELL_WIDTH - 1) as usize, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpearmanMatrix;
    use crate::viz::heatmap::{COLD, NEUTRAL, WARM};

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    fn grid() -> HeatmapGrid {
        HeatmapGrid::new(&SpearmanMatrix::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, -1.0], vec![-1.0, 0.0]],
        ))
        .unwrap()
    }

    #[test]
    fn test_cells_carry_labels_and_colors() {
        let grid = grid();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        HeatmapWidget::new(Some(&grid), &theme).render(area, &mut buf);

        assert!(row_text(&buf, 0).contains('a'));
        let first = row_text(&buf, 1);
        assert!(first.contains("1.00"));
        assert!(first.contains("-1.00"));

        // grid starts after the one-char label and a gap
        assert_eq!(buf[(2, 1)].bg, Color::from(WARM));
        assert_eq!(buf[(9, 1)].bg, Color::from(COLD));
        assert_eq!(buf[(9, 2)].bg, Color::from(NEUTRAL));
    }

    #[test]
    fn test_narrow_area_clips_columns() {
        let grid = grid();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        HeatmapWidget::new(Some(&grid), &theme).render(area, &mut buf);
        assert!(!row_text(&buf, 1).contains("-1.00"));
    }

    #[test]
    fn test_placeholder() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        HeatmapWidget::new(None, &theme).render(area, &mut buf);
        assert!(row_text(&buf, 0).starts_with("Correlation matrix unavailable"));
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_color(NEUTRAL), Color::Black);
        assert_eq!(text_color(COLD), Color::White);
    }
}
