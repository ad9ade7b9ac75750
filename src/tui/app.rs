use crate::core::{AnalysisResult, DatasetRef, DisplayMode, DragPayload, View};
use crate::services::{
    AnalysisService, ResultStore, ResultsPage, ServiceEvent, UploadPage, spawn_analyze,
    spawn_health, spawn_probe,
};
use crate::tui::components::{FilePrompt, ResultsView, UploadView};
use crate::tui::{
    Action, ActionCategory, ActionResult, Command, Component, Focusable, KeyBindings, KeyPattern,
    Navigator, Theme,
};
use color_eyre::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// One-line message under the active view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Application state
///
/// Routes terminal events to the active view, starts service calls and
/// applies their responses as they arrive on the event loop.
pub struct App<S: AnalysisService> {
    service: Arc<S>,

    /// Where spawned service tasks report back
    events: UnboundedSender<ServiceEvent>,

    store: ResultStore,

    navigator: Navigator,

    upload: UploadView,

    /// Present while the results view is showing
    results: Option<ResultsView>,

    /// Path prompt overlay (when active)
    prompt: Option<FilePrompt>,

    /// File paste shown as "receiving" until the next tick drops it
    pending_drop: Option<DragPayload>,

    show_help: bool,

    status: Option<Status>,

    keybindings: KeyBindings,

    theme: Theme,

    default_mode: DisplayMode,

    should_quit: bool,
}

impl<S: AnalysisService> App<S> {
    pub fn new(service: Arc<S>, store: ResultStore, events: UnboundedSender<ServiceEvent>) -> Self {
        let theme = Theme::default();
        Self {
            service,
            events,
            store,
            navigator: Navigator::new(),
            upload: UploadView::new(theme.clone()),
            results: None,
            prompt: None,
            pending_drop: None,
            show_help: false,
            status: None,
            keybindings: KeyBindings::default(),
            theme,
            default_mode: DisplayMode::default(),
            should_quit: false,
        }
    }

    /// Handle a terminal event
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Paste(text) => self.handle_paste(&text),
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                if let Some(results) = &mut self.results {
                    results.hover(mouse.column, mouse.row);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // The prompt sees raw keys first so typing is not taken as shortcuts
        if let Some(prompt) = &mut self.prompt {
            let result = prompt.handle_key(key)?;
            if result.is_handled() {
                return self.apply(result);
            }
        }

        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }
        Ok(())
    }

    /// Handle an action
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        // App-level actions
        match action {
            Action::Quit => {
                self.should_quit = true;
                return Ok(());
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                return Ok(());
            }
            Action::Cancel if self.show_help => {
                self.show_help = false;
                return Ok(());
            }
            Action::CheckHealth if self.prompt.is_none() => {
                self.status = Some(Status::info("Checking service…"));
                spawn_health(self.service.clone(), self.events.clone());
                return Ok(());
            }
            _ => {}
        }
        if self.show_help {
            return Ok(());
        }

        let result = if let Some(prompt) = &mut self.prompt {
            prompt.handle_action(action)?
        } else {
            match self.navigator.view() {
                View::Upload => self.upload.handle_action(action)?,
                View::Results => match &mut self.results {
                    Some(results) => results.handle_action(action)?,
                    None => ActionResult::Ignored,
                },
            }
        };
        self.apply(result)
    }

    /// The upload view gives up focus while the prompt is over it
    fn set_prompt(&mut self, prompt: Option<FilePrompt>) {
        self.upload.set_focused(prompt.is_none());
        self.prompt = prompt;
    }

    fn apply(&mut self, result: ActionResult) -> Result<()> {
        let ActionResult::Emit(command) = result else {
            return Ok(());
        };
        match command {
            Command::OpenFilePrompt => {
                let current = self.upload.page().dataset().map(|d| d.path.clone());
                self.set_prompt(Some(FilePrompt::new(self.theme.clone(), current.as_deref())));
            }
            Command::ClosePrompt => self.set_prompt(None),
            Command::SubmitPath(path) => {
                self.set_prompt(None);
                self.open_path(&path);
            }
            Command::Analyze(request) => {
                info!(
                    "Analyzing {} for target '{}'",
                    request.dataset.file_name, request.target
                );
                self.status = None;
                spawn_analyze(self.service.clone(), request, self.events.clone());
            }
            Command::Back => self.show_upload(),
        }
        Ok(())
    }

    /// A paste on the upload view is how terminals deliver a dropped file
    fn handle_paste(&mut self, text: &str) {
        if let Some(prompt) = &mut self.prompt {
            prompt.paste(text);
            return;
        }
        if self.navigator.view() != View::Upload {
            return;
        }

        self.finish_drop();
        let payload = DragPayload::from_pasted_text(text, |p| p.is_file());
        if !payload.has_files() {
            debug!("Pasted text is not a file drop; ignoring");
            return;
        }
        let page = self.upload.page_mut();
        page.drag_enter(&payload);
        page.drag_over(&payload);
        self.pending_drop = Some(payload);
    }

    /// Drop a pasted file that has been shown as receiving
    fn finish_drop(&mut self) {
        let Some(payload) = self.pending_drop.take() else {
            return;
        };
        if let Some(path) = self.upload.page_mut().drop_payload(&payload) {
            self.open_path(&path);
        }
    }

    /// Take the file at `path` and probe its columns
    pub fn open_path(&mut self, path: &Path) {
        match DatasetRef::from_path(path) {
            Ok(dataset) => {
                info!("Selected {} ({} bytes)", dataset.file_name, dataset.size);
                let request = self.upload.page_mut().accept_file(dataset);
                spawn_probe(self.service.clone(), request, self.events.clone());
            }
            Err(e) => {
                warn!("Cannot use {}: {e}", path.display());
                self.upload
                    .page_mut()
                    .reject_file(format!("Cannot open {}: {e}", path.display()));
            }
        }
    }

    /// Apply a finished service call
    pub fn handle_service_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::ColumnsProbed(outcome) => self.upload.page_mut().apply_probe(outcome),
            ServiceEvent::AnalysisFinished(outcome) => {
                let navigate = self
                    .upload
                    .page_mut()
                    .apply_analysis(outcome, &mut self.store);
                if let Some(result) = navigate {
                    self.show_results(Some(result));
                }
            }
            ServiceEvent::HealthChecked(Ok(status)) => {
                self.status = Some(Status::info(format!("Service status: {status}")));
            }
            ServiceEvent::HealthChecked(Err(e)) => {
                warn!("Health check failed: {e}");
                self.status = Some(Status::error(format!("Service unavailable: {e}")));
            }
        }
    }

    /// Switch to the results view, resolving what it shows through the store
    pub fn show_results(&mut self, handoff: Option<AnalysisResult>) {
        self.set_prompt(None);
        self.navigator.to_results(handoff);
        let page = ResultsPage::mount(&self.store, self.navigator.take_handoff(), self.default_mode);
        self.results = Some(ResultsView::new(page, self.theme.clone()));
    }

    /// Back to the upload view; its state is kept as it was
    pub fn show_upload(&mut self) {
        self.navigator.to_upload();
        self.results = None;
    }

    /// Check if the app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Update app state (called on every tick)
    pub fn update(&mut self) -> Result<()> {
        self.finish_drop();
        self.upload.update()?;
        if let Some(results) = &mut self.results {
            results.update()?;
        }
        Ok(())
    }

    /// Render the app
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main_area, status_area, footer_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        match (self.navigator.view(), &mut self.results) {
            (View::Results, Some(results)) => results.render(frame, main_area),
            _ => self.upload.render(frame, main_area),
        }

        if let Some(status) = &self.status {
            let style = if status.is_error {
                self.theme.error_style()
            } else {
                self.theme.info_style()
            };
            frame.render_widget(Paragraph::new(status.message.as_str()).style(style), status_area);
        }
        frame.render_widget(
            Paragraph::new(self.footer_hints()).style(self.theme.muted_style()),
            footer_area,
        );

        if let Some(prompt) = &mut self.prompt {
            prompt.render(frame, Self::centered_rect(70, 40, area));
        }
        if self.show_help {
            self.render_help(frame, Self::centered_rect(70, 80, area));
        }
    }

    fn key_label(&self, action: Action) -> Option<String> {
        self.keybindings.primary_key(action).map(|key| {
            KeyPattern::from_string(&key)
                .map(|p| p.to_string())
                .unwrap_or(key)
        })
    }

    fn footer_hints(&self) -> String {
        let mut actions: Vec<Action> = if self.prompt.is_some() {
            vec![Action::Confirm, Action::Cancel]
        } else {
            match (self.navigator.view(), &self.results) {
                (View::Results, Some(results)) => results.supported_actions().to_vec(),
                _ => self.upload.supported_actions().to_vec(),
            }
        };
        actions.dedup_by_key(|a| a.hint());
        actions.extend([Action::CheckHealth, Action::ToggleHelp, Action::Quit]);

        actions
            .into_iter()
            .filter_map(|a| self.key_label(a).map(|k| format!("{k} {}", a.hint())))
            .collect::<Vec<_>>()
            .join(" · ")
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(self.theme.focused_border_style());

        let mut lines = Vec::new();
        for category in ActionCategory::all() {
            lines.push(Line::from(category.to_string()).style(self.theme.header_style()));
            for action in Action::all().into_iter().filter(|a| a.category() == category) {
                let keys = self
                    .keybindings
                    .get_keys_for_action(action)
                    .into_iter()
                    .map(|k| KeyPattern::from_string(&k).map(|p| p.to_string()).unwrap_or(k))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(Line::from(format!("  {keys:<16} {}", action.description())));
            }
        }
        frame.render_widget(
            Paragraph::new(lines)
                .style(self.theme.normal_style())
                .block(block),
            area,
        );
    }

    /// Helper to create centered rectangle
    fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
        let width = (area.width * percent_w) / 100;
        let height = (area.height * percent_h) / 100;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn view(&self) -> View {
        self.navigator.view()
    }

    pub fn upload_page(&self) -> &UploadPage {
        self.upload.page()
    }

    pub fn results_page(&self) -> Option<&ResultsPage> {
        self.results.as_ref().map(|r| r.page())
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Get reference to theme
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.upload.set_theme(theme.clone());
        if let Some(results) = &mut self.results {
            results.set_theme(theme.clone());
        }
        self.theme = theme;
    }

    /// Get keybindings
    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }

    /// Scale a newly opened results view starts in
    pub fn set_default_mode(&mut self, mode: DisplayMode) {
        self.default_mode = mode;
    }
}
