use crate::viz::Rgb;
use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the TUI
///
/// Chart bar and heatmap hues are fixed by the visual encoding and live in
/// `viz`; a theme only decides what they are blended against.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,

    // General UI colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Table colors
    pub header_fg: Color,
    pub header_bg: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub row_alt_bg: Color,
    pub target_row_bg: Color,

    // Charts
    /// What bar opacity is blended against
    pub chart_bg: Rgb,
    pub gauge_fg: Color,

    // Status/feedback colors
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Theme {
    /// Dark theme
    fn default() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            header_fg: Color::Cyan,
            header_bg: Color::Reset,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            row_alt_bg: Color::Rgb(25, 25, 35),
            target_row_bg: Color::Rgb(45, 40, 20),
            chart_bg: Rgb(20, 20, 28),
            gauge_fg: Color::Cyan,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Blue,
            header_fg: Color::Blue,
            header_bg: Color::Rgb(240, 240, 240),
            selected_fg: Color::White,
            selected_bg: Color::Blue,
            row_alt_bg: Color::Rgb(250, 250, 250),
            target_row_bg: Color::Rgb(255, 243, 205),
            chart_bg: Rgb(255, 255, 255),
            gauge_fg: Color::Blue,
            error: Color::Red,
            warning: Color::Rgb(200, 150, 0), // readable on white
            info: Color::Blue,
        }
    }

    /// Look up a built-in theme; unknown names fall back to dark
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::default(),
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn alt_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.row_alt_bg)
    }

    /// Row of the current analysis target in the five-number table
    pub fn target_row_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.target_row_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Style of the primary button, dimmed when it cannot be pressed
    pub fn button_style(&self, enabled: bool) -> Style {
        if enabled {
            self.selected_style()
        } else {
            Style::default()
                .fg(self.muted)
                .add_modifier(Modifier::DIM)
        }
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }
}
