use crate::core::{DisplayMode, ResultsSection};
use crate::services::ResultsPage;
use crate::tui::components::bar_chart::{self, ContributionChart};
use crate::tui::components::five_num_table::FiveNumTableWidget;
use crate::tui::components::spearman_heatmap::HeatmapWidget;
use crate::tui::{Action, ActionResult, Command, Component, Theme};
use crate::viz::BarChartData;
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap},
};
use strum::IntoEnumIterator;

/// Results screen: header, section tabs and the section body
pub struct ResultsView {
    page: ResultsPage,
    theme: Theme,
    /// Where the bars were last drawn, for mouse hover
    chart_area: Option<Rect>,
    chart_offset: usize,
    /// Whether the pointer is currently over a bar
    hovering: bool,
    supported_actions: Vec<Action>,
}

impl ResultsView {
    pub fn new(page: ResultsPage, theme: Theme) -> Self {
        Self {
            page,
            theme,
            chart_area: None,
            chart_offset: 0,
            hovering: false,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::NextSection,
                Action::PrevSection,
                Action::ToggleMode,
                Action::ShowAbsolute,
                Action::ShowPercent,
                Action::Back,
            ],
        }
    }

    pub fn page(&self) -> &ResultsPage {
        &self.page
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Pointer moved; emphasize the bar under it
    ///
    /// Leaving the bars clears an emphasis the pointer set, but not one set
    /// from the keyboard.
    pub fn hover(&mut self, column: u16, row: u16) {
        let over = match (self.page.section(), self.chart_area, self.page.bar_chart()) {
            (ResultsSection::InfoDecomp, Some(area), Some(chart)) => {
                bar_chart::bar_at(area, self.chart_offset, chart.bars.len(), column, row)
                    .map(|idx| chart.bars[idx].feature.clone())
            }
            _ => None,
        };
        match over {
            Some(feature) => {
                self.page.hover_bar(Some(&feature));
                self.hovering = true;
            }
            None if self.hovering => {
                self.page.hover_bar(None);
                self.hovering = false;
            }
            None => {}
        }
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from("No analysis result to show."),
            Line::from("Go back to upload a dataset and run a decomposition."),
        ];
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(self.theme.muted_style())
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let sections: Vec<ResultsSection> = ResultsSection::iter().collect();
        let selected = sections
            .iter()
            .position(|s| *s == self.page.section())
            .unwrap_or(0);
        let tabs = Tabs::new(sections.iter().map(|s| s.title()))
            .select(selected)
            .style(self.theme.muted_style())
            .highlight_style(self.theme.selected_style());
        frame.render_widget(tabs, area);
    }

    fn render_info_decomp(&mut self, frame: &mut Frame, area: Rect) {
        let [gauge_area, mode_area, chart_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(area);

        if let Some((ratio, label)) = self.page.entropy_gauge() {
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(" Explained entropy ")
                        .borders(Borders::ALL)
                        .border_style(self.theme.border_style()),
                )
                .gauge_style(Style::default().fg(self.theme.gauge_fg))
                .ratio(ratio)
                .label(label);
            frame.render_widget(gauge, gauge_area);
        }

        let Some(chart) = self.page.bar_chart() else {
            return;
        };
        frame.render_widget(
            Paragraph::new(self.mode_line(&chart)).style(self.theme.muted_style()),
            mode_area,
        );

        let block = Block::default()
            .title(" Contributions ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(chart_area);
        frame.render_widget(block, chart_area);

        let active = self.page.active_bar().and_then(|f| chart.position(f));
        self.chart_offset = bar_chart::scroll_offset(chart.bars.len(), inner.height as usize, active);
        self.chart_area = Some(inner);
        frame.render_widget(
            ContributionChart::new(&chart, &self.theme).offset(self.chart_offset),
            inner,
        );
    }

    fn mode_line(&self, chart: &BarChartData) -> String {
        let mut line = format!("Scale: {} (m to toggle)", chart.mode.label());
        if chart.mode != self.page.display_mode() {
            line.push_str(" · entropy is 0, showing absolute values");
        }
        line
    }

    fn render_overview(&mut self, frame: &mut Frame, area: Rect) {
        self.chart_area = None;
        let rows = self.page.five_num_rows();
        let table_height = (rows.len() as u16).max(1) + 3;
        let [table_area, heatmap_area] =
            Layout::vertical([Constraint::Max(table_height), Constraint::Min(3)]).areas(area);

        let table_block = Block::default()
            .title(" Five-number summary ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = table_block.inner(table_area);
        frame.render_widget(table_block, table_area);
        frame.render_widget(FiveNumTableWidget::new(&rows, &self.theme), inner);

        let heatmap_block = Block::default()
            .title(" Spearman correlation ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = heatmap_block.inner(heatmap_area);
        frame.render_widget(heatmap_block, heatmap_area);
        let grid = self.page.heatmap();
        frame.render_widget(HeatmapWidget::new(grid.as_ref(), &self.theme), inner);
    }
}

impl Component for ResultsView {
    fn handle_action(&mut self, action: Action) -> Result<ActionResult> {
        if self.page.result().is_none() {
            return Ok(match action {
                Action::Back | Action::Cancel => ActionResult::Emit(Command::Back),
                _ => ActionResult::Ignored,
            });
        }
        Ok(match action {
            Action::MoveDown if self.page.section() == ResultsSection::InfoDecomp => {
                self.hovering = false;
                self.page.focus_next_bar();
                ActionResult::Consumed
            }
            Action::MoveUp if self.page.section() == ResultsSection::InfoDecomp => {
                self.hovering = false;
                self.page.focus_prev_bar();
                ActionResult::Consumed
            }
            // Two sections, so either direction flips between them
            Action::NextSection | Action::PrevSection => {
                self.page.next_section();
                ActionResult::Consumed
            }
            Action::ToggleMode => {
                self.page.toggle_display_mode();
                ActionResult::Consumed
            }
            Action::ShowAbsolute => {
                self.page.set_display_mode(DisplayMode::Absolute);
                ActionResult::Consumed
            }
            Action::ShowPercent => {
                self.page.set_display_mode(DisplayMode::Percent);
                ActionResult::Consumed
            }
            Action::Back | Action::Cancel => ActionResult::Emit(Command::Back),
            _ => ActionResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" ShapMI · Results ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(header) = self.page.header() else {
            self.chart_area = None;
            self.render_placeholder(frame, inner);
            return;
        };

        let [header_area, tabs_area, body_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(header).style(self.theme.header_style()),
            header_area,
        );
        self.render_tabs(frame, tabs_area);
        match self.page.section() {
            ResultsSection::InfoDecomp => self.render_info_decomp(frame, body_area),
            ResultsSection::Overview => self.render_overview(frame, body_area),
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "ResultsView"
    }
}
