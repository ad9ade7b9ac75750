use crate::services::{PrimaryAction, UploadPage};
use crate::tui::{Action, ActionResult, Command, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

/// Upload screen: file selection, target choice and the primary button
pub struct UploadView {
    page: UploadPage,
    theme: Theme,
    focused: bool,
    supported_actions: Vec<Action>,
}

impl UploadView {
    pub fn new(theme: Theme) -> Self {
        Self {
            page: UploadPage::default(),
            theme,
            focused: true,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::OpenFile,
                Action::Confirm,
            ],
        }
    }

    pub fn page(&self) -> &UploadPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut UploadPage {
        &mut self.page
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn primary(&mut self) -> ActionResult {
        match self.page.primary_action() {
            PrimaryAction::SelectFile => ActionResult::Emit(Command::OpenFilePrompt),
            PrimaryAction::Decompose => match self.page.analyze() {
                Some(request) => ActionResult::Emit(Command::Analyze(request)),
                None => ActionResult::Consumed,
            },
            // Disabled
            PrimaryAction::SelectTarget | PrimaryAction::Analyzing => ActionResult::Consumed,
        }
    }

    fn render_drop_zone(&self, frame: &mut Frame, area: Rect) {
        let receiving = self.page.is_receiving_file();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if receiving {
                BorderType::Double
            } else {
                BorderType::Rounded
            })
            .border_style(if receiving {
                self.theme.focused_border_style()
            } else {
                self.theme.border_style()
            });
        let text = if receiving {
            Line::from("Release to use this file").style(self.theme.info_style())
        } else {
            Line::from("Drop a .csv / .xlsx / .xls file here, or press o to enter a path")
                .style(self.theme.muted_style())
        };
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            area,
        );
    }

    fn render_selection(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        match self.page.selected_label() {
            Some(label) => lines.push(Line::from(label).style(self.theme.normal_style())),
            None => lines.push(Line::from("No file selected").style(self.theme.muted_style())),
        }
        if let Some(hint) = self.page.extension_hint() {
            lines.push(Line::from(hint).style(self.theme.warning_style()));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_columns(&self, frame: &mut Frame, area: Rect) {
        let title = match self.page.target() {
            Some(target) => format!(" Target: {target} "),
            None => " Target column ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if self.focused {
                self.theme.focused_border_style()
            } else {
                self.theme.border_style()
            });

        if self.page.columns().is_empty() {
            let text = if self.page.is_probing() {
                "Reading columns…"
            } else if self.page.dataset().is_some() {
                "No columns available"
            } else {
                "Select a file to list its columns"
            };
            frame.render_widget(
                Paragraph::new(text).style(self.theme.muted_style()).block(block),
                area,
            );
            return;
        }

        let target = self.page.target();
        let items: Vec<ListItem> = self
            .page
            .columns()
            .iter()
            .map(|c| {
                let mark = if Some(c.as_str()) == target { "● " } else { "○ " };
                ListItem::new(format!("{mark}{c}"))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .style(self.theme.normal_style())
            .highlight_style(self.theme.selected_style());
        let mut state = ListState::default().with_selected(Some(self.page.target_cursor()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let action = self.page.primary_action();
        let mut spans = vec![Span::styled(
            format!("[ {} ]", action.label()),
            self.theme.button_style(action.is_enabled()),
        )];
        if let Some(err) = self.page.error() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                err.to_string(),
                self.theme.error_style().add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for UploadView {
    fn handle_action(&mut self, action: Action) -> Result<ActionResult> {
        Ok(match action {
            Action::MoveUp => {
                self.page.select_prev_target();
                ActionResult::Consumed
            }
            Action::MoveDown => {
                self.page.select_next_target();
                ActionResult::Consumed
            }
            Action::OpenFile => ActionResult::Emit(Command::OpenFilePrompt),
            Action::Confirm => self.primary(),
            _ => ActionResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" ShapMI · Upload ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [drop_area, selection_area, columns_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_drop_zone(frame, drop_area);
        self.render_selection(frame, selection_area);
        self.render_columns(frame, columns_area);
        self.render_footer(frame, footer_area);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "UploadView"
    }
}

impl Focusable for UploadView {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
