//! Path prompt used as the explicit file picker.

use crate::config::expand_tilde;
use crate::tui::{Action, ActionResult, Command, Component, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::path::{Path, PathBuf};
use tui_textarea::TextArea;

pub struct FilePrompt {
    input: TextArea<'static>,
    error: Option<String>,
    theme: Theme,
}

impl FilePrompt {
    pub fn new(theme: Theme, initial: Option<&Path>) -> Self {
        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_placeholder_text("path/to/dataset.csv");
        if let Some(path) = initial {
            input.insert_str(path.to_string_lossy());
        }
        Self {
            input,
            error: None,
            theme,
        }
    }

    /// Entered path with surrounding quotes removed and `~` expanded
    pub fn value(&self) -> Option<PathBuf> {
        let raw = self.input.lines().first().map(|l| l.trim()).unwrap_or("");
        let unquoted = raw
            .strip_prefix(['\'', '"'])
            .and_then(|s| s.strip_suffix(['\'', '"']))
            .unwrap_or(raw)
            .trim();
        if unquoted.is_empty() {
            None
        } else {
            Some(expand_tilde(Path::new(unquoted)))
        }
    }

    /// Insert pasted text; only its first line is kept
    pub fn paste(&mut self, text: &str) {
        self.error = None;
        self.input.insert_str(text.lines().next().unwrap_or(""));
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn submit(&mut self) -> ActionResult {
        match self.value() {
            Some(path) => ActionResult::Emit(Command::SubmitPath(path)),
            None => {
                self.error = Some("Enter a file path".to_string());
                ActionResult::Consumed
            }
        }
    }
}

impl Component for FilePrompt {
    fn handle_action(&mut self, action: Action) -> Result<ActionResult> {
        Ok(match action {
            Action::Confirm => self.submit(),
            Action::Cancel => ActionResult::Emit(Command::ClosePrompt),
            _ => ActionResult::Ignored,
        })
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<ActionResult> {
        if key.kind != KeyEventKind::Press {
            return Ok(ActionResult::Consumed);
        }
        Ok(match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => ActionResult::Emit(Command::ClosePrompt),
            // Leave Ctrl+C to the global quit binding
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ActionResult::Ignored
            }
            _ => {
                self.error = None;
                self.input.input(key);
                ActionResult::Consumed
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Open dataset ")
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(self.theme.focused_border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [input_area, message_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);

        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border_style())
                .title("Path"),
        );
        frame.render_widget(&self.input, input_area);

        let wrap_width = message_area.width.max(1) as usize;
        let message = match &self.error {
            Some(err) => {
                let lines: Vec<Line> = textwrap::wrap(err, wrap_width)
                    .into_iter()
                    .map(|l| Line::from(l.into_owned()))
                    .collect();
                Paragraph::new(lines).style(self.theme.error_style())
            }
            None => Paragraph::new("Enter: open · Esc: cancel · .csv, .xlsx, .xls")
                .style(self.theme.muted_style()),
        };
        frame.render_widget(message, message_area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "FilePrompt"
    }
}
