use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    NextSection,
    PrevSection,
    Back,

    // Upload
    OpenFile,
    Confirm,

    // Results
    ToggleMode,
    ShowAbsolute,
    ShowPercent,

    // Application
    ToggleHelp,
    CheckHealth,
    Cancel,
    Quit,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Previous column or bar",
            Action::MoveDown => "Next column or bar",
            Action::NextSection => "Next results section",
            Action::PrevSection => "Previous results section",
            Action::Back => "Back to upload",
            Action::OpenFile => "Select a file",
            Action::Confirm => "Run the primary action",
            Action::ToggleMode => "Toggle abs / % of entropy",
            Action::ShowAbsolute => "Show absolute values",
            Action::ShowPercent => "Show % of entropy",
            Action::ToggleHelp => "Toggle help screen",
            Action::CheckHealth => "Check the analysis service",
            Action::Cancel => "Close prompt or go back",
            Action::Quit => "Quit application",
        }
    }

    /// Short label for the footer
    pub fn hint(&self) -> &'static str {
        match self {
            Action::MoveUp => "up",
            Action::MoveDown => "down",
            Action::NextSection => "section",
            Action::PrevSection => "section",
            Action::Back => "back",
            Action::OpenFile => "open",
            Action::Confirm => "go",
            Action::ToggleMode => "mode",
            Action::ShowAbsolute => "abs",
            Action::ShowPercent => "%",
            Action::ToggleHelp => "help",
            Action::CheckHealth => "health",
            Action::Cancel => "cancel",
            Action::Quit => "quit",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::NextSection
            | Action::PrevSection
            | Action::Back => ActionCategory::Navigation,

            Action::OpenFile | Action::Confirm => ActionCategory::Upload,

            Action::ToggleMode | Action::ShowAbsolute | Action::ShowPercent => {
                ActionCategory::Results
            }

            Action::ToggleHelp | Action::CheckHealth | Action::Cancel | Action::Quit => {
                ActionCategory::Application
            }
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
            Action::MoveUp,
            Action::MoveDown,
            Action::NextSection,
            Action::PrevSection,
            Action::Back,
            Action::OpenFile,
            Action::Confirm,
            Action::ToggleMode,
            Action::ShowAbsolute,
            Action::ShowPercent,
            Action::ToggleHelp,
            Action::CheckHealth,
            Action::Cancel,
            Action::Quit,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Upload,
    Results,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 4] {
        [
            ActionCategory::Navigation,
            ActionCategory::Upload,
            ActionCategory::Results,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Upload => write!(f, "Upload"),
            ActionCategory::Results => write!(f, "Results"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_actions_have_descriptions() {
        for action in Action::all() {
            assert!(!action.description().is_empty());
            assert!(!action.hint().is_empty());
        }
    }

    #[test]
    fn test_every_category_is_used() {
        for category in ActionCategory::all() {
            assert!(Action::all().iter().any(|a| a.category() == category));
        }
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::ToggleMode;
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, "\"ToggleMode\"");

        let restored: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, action);
    }
}
