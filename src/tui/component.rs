use crate::services::AnalyzeRequest;
use crate::tui::action::Action;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use std::path::PathBuf;

/// Work a component asks the app to do on its behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the file path prompt
    OpenFilePrompt,
    /// Close the file path prompt without choosing
    ClosePrompt,
    /// A path was entered in the prompt
    SubmitPath(PathBuf),
    /// Send an analyze request
    Analyze(AnalyzeRequest),
    /// Leave the results view
    Back,
}

/// Outcome of handing an action or key to a component
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Not handled; the caller may try elsewhere
    Ignored,
    /// Handled entirely inside the component
    Consumed,
    /// Handled, and the app has to act on the command
    Emit(Command),
}

impl ActionResult {
    pub fn is_handled(&self) -> bool {
        !matches!(self, ActionResult::Ignored)
    }
}

/// Base trait for all TUI components
///
/// All interactive UI elements implement this trait to provide consistent
/// behavior for action handling, rendering, and component lifecycle.
pub trait Component {
    /// Handle an action resolved from the keybindings
    fn handle_action(&mut self, action: Action) -> Result<ActionResult>;

    /// Handle a raw key before keybinding lookup
    ///
    /// Text inputs override this so typed characters are not taken as
    /// shortcuts. The default leaves every key to the keybindings.
    fn handle_key(&mut self, _key: KeyEvent) -> Result<ActionResult> {
        Ok(ActionResult::Ignored)
    }

    /// Render the component to the terminal
    ///
    /// Components are responsible for rendering themselves within the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Actions this component reacts to, for the footer and help screen
    fn supported_actions(&self) -> &[Action];

    /// Get component name for debugging/logging
    fn name(&self) -> &str;

    /// Update component state (called on every tick)
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that can receive keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
