//! Pure transforms from an analysis result to what the views draw.
//!
//! Nothing in here touches the terminal; the widgets in `tui::components`
//! only lay these values out.

pub mod bar_chart;
pub mod five_num;
pub mod heatmap;

pub use bar_chart::{Bar, BarChartData};
pub use five_num::{FiveNumRow, RowCells};
pub use heatmap::{HeatmapCell, HeatmapGrid, Hue};

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Composite `self` at `alpha` over `base`
    pub fn over(self, base: Rgb, alpha: f64) -> Rgb {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
        Rgb(mix(self.0, base.0), mix(self.1, base.1), mix(self.2, base.2))
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.0, c.1, c.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        let fg = Rgb(200, 100, 0);
        let bg = Rgb(0, 0, 0);
        assert_eq!(fg.over(bg, 1.0), fg);
        assert_eq!(fg.over(bg, 0.0), bg);
        assert_eq!(fg.over(bg, 0.5), Rgb(100, 50, 0));
        assert_eq!(fg.over(bg, f64::NAN), bg);
    }
}
