use crate::tui::action::Action;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Maps KeyEvents to Actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(rename = "bindings")]
    bindings_list: Vec<KeyBinding>,

    #[serde(skip)]
    bindings_map: HashMap<KeyPattern, Action>,
}

/// Single keybinding entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: Action,
}

/// Pattern for matching key events
///
/// Character keys carry their case in the character itself, so SHIFT is
/// never part of a character pattern. `BackTab` likewise implies SHIFT.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings_list = vec![
            // Navigation
            KeyBinding::new("Up", Action::MoveUp),
            KeyBinding::new("Down", Action::MoveDown),
            KeyBinding::new("k", Action::MoveUp),
            KeyBinding::new("j", Action::MoveDown),
            KeyBinding::new("Tab", Action::NextSection),
            KeyBinding::new("BackTab", Action::PrevSection),
            KeyBinding::new("b", Action::Back),
            // Upload
            KeyBinding::new("o", Action::OpenFile),
            KeyBinding::new("Enter", Action::Confirm),
            // Results
            KeyBinding::new("m", Action::ToggleMode),
            KeyBinding::new("a", Action::ShowAbsolute),
            KeyBinding::new("p", Action::ShowPercent),
            // Application
            KeyBinding::new("?", Action::ToggleHelp),
            KeyBinding::new("F1", Action::ToggleHelp),
            KeyBinding::new("h", Action::CheckHealth),
            KeyBinding::new("Esc", Action::Cancel),
            KeyBinding::new("q", Action::Quit),
            KeyBinding::new("Ctrl+c", Action::Quit),
        ];

        Self::from_list(bindings_list)
    }
}

impl KeyBindings {
    fn from_list(bindings_list: Vec<KeyBinding>) -> Self {
        let bindings_map = Self::build_map(&bindings_list);
        Self {
            bindings_list,
            bindings_map,
        }
    }

    /// Build hashmap from bindings list
    fn build_map(bindings: &[KeyBinding]) -> HashMap<KeyPattern, Action> {
        bindings
            .iter()
            .filter_map(|b| {
                KeyPattern::from_string(&b.key)
                    .ok()
                    .map(|pattern| (pattern, b.action))
            })
            .collect()
    }

    /// Get action for key event
    pub fn get_action(&self, key: &KeyEvent) -> Option<Action> {
        let pattern = KeyPattern::from_event(key);
        self.bindings_map.get(&pattern).copied()
    }

    /// Load from a JSON or JSON5 config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let bindings: KeyBindings = json5::from_str(&content)?;
        Ok(Self::from_list(bindings.bindings_list))
    }

    /// Save to JSON config file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get all bindings for an action (for help display)
    pub fn get_keys_for_action(&self, action: Action) -> Vec<String> {
        self.bindings_list
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.key.clone())
            .collect()
    }

    /// First key bound to `action`, for compact hints
    pub fn primary_key(&self, action: Action) -> Option<String> {
        self.bindings_list
            .iter()
            .find(|b| b.action == action)
            .map(|b| b.key.clone())
    }

    /// Actions that don't have any keybindings
    pub fn get_unbound_actions(&self) -> Vec<(Action, &'static str)> {
        let bound_actions: HashSet<Action> = self.bindings_list.iter().map(|b| b.action).collect();

        Action::all()
            .into_iter()
            .filter(|action| !bound_actions.contains(action))
            .map(|action| (action, action.description()))
            .collect()
    }

    /// Validate bindings and return warnings
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen: HashMap<KeyPattern, (&str, Action)> = HashMap::new();
        for binding in &self.bindings_list {
            match KeyPattern::from_string(&binding.key) {
                Ok(pattern) => {
                    if let Some((key, existing)) = seen.get(&pattern) {
                        warnings.push(format!(
                            "Duplicate key '{}': bound to both {:?} (as '{}') and {:?}",
                            binding.key, existing, key, binding.action
                        ));
                    } else {
                        seen.insert(pattern, (&binding.key, binding.action));
                    }
                }
                Err(e) => warnings.push(format!(
                    "Invalid key pattern '{}' for action {:?}: {}",
                    binding.key, binding.action, e
                )),
            }
        }

        let unbound = self.get_unbound_actions();
        if !unbound.is_empty() {
            warnings.push(format!(
                "{} action(s) have no keybindings: {}",
                unbound.len(),
                unbound
                    .iter()
                    .map(|(action, _)| format!("{:?}", action))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        warnings
    }
}

impl KeyBinding {
    pub fn new(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
        }
    }
}

impl KeyPattern {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        let mut modifiers = event.modifiers;
        if matches!(event.code, KeyCode::Char(_) | KeyCode::BackTab) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        Self {
            code: event.code,
            modifiers,
        }
    }

    /// Parse from string (e.g., "Ctrl+c", "?", "BackTab", "F1")
    pub fn from_string(s: &str) -> Result<Self, String> {
        // A lone "+" is the plus key, not a separator
        let parts: Vec<&str> = if s == "+" {
            vec!["+"]
        } else {
            s.split('+').collect()
        };
        let (key_part, modifier_parts) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (*key, mods),
            _ => return Err(format!("Empty key in '{}'", s)),
        };

        let mut modifiers = KeyModifiers::empty();
        for part in modifier_parts {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "cmd" | "command" | "super" => {
                    #[cfg(target_os = "macos")]
                    {
                        modifiers |= KeyModifiers::SUPER;
                    }
                    #[cfg(not(target_os = "macos"))]
                    {
                        modifiers |= KeyModifiers::CONTROL;
                    }
                }
                _ => return Err(format!("Unknown modifier: {}", part)),
            }
        }

        let mut chars = key_part.chars();
        let code = match (chars.next(), chars.next()) {
            // Single characters keep their case
            (Some(ch), None) => KeyCode::Char(ch),
            _ => match key_part.to_lowercase().as_str() {
                "up" => KeyCode::Up,
                "down" => KeyCode::Down,
                "left" => KeyCode::Left,
                "right" => KeyCode::Right,
                "pageup" | "pgup" => KeyCode::PageUp,
                "pagedown" | "pgdown" | "pgdn" => KeyCode::PageDown,
                "home" => KeyCode::Home,
                "end" => KeyCode::End,
                "tab" => KeyCode::Tab,
                "backtab" => KeyCode::BackTab,
                "enter" | "return" => KeyCode::Enter,
                "esc" | "escape" => KeyCode::Esc,
                "backspace" => KeyCode::Backspace,
                "delete" | "del" => KeyCode::Delete,
                "space" => KeyCode::Char(' '),
                f if f.starts_with('f') => match f[1..].parse::<u8>() {
                    Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
                    _ => return Err(format!("Invalid function key: {}", key_part)),
                },
                _ => return Err(format!("Unknown key: {}", key_part)),
            },
        };

        // Shift+Tab is how some configs spell BackTab
        let code = if code == KeyCode::Tab && modifiers.contains(KeyModifiers::SHIFT) {
            KeyCode::BackTab
        } else {
            code
        };

        Ok(Self::from_event(&KeyEvent::new(code, modifiers)))
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if self.modifiers.contains(KeyModifiers::SUPER) {
            parts.push(if cfg!(target_os = "macos") { "Cmd" } else { "Super" }.to_string());
        }
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        parts.push(match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            other => format!("{:?}", other),
        });
        write!(f, "{}", parts.join("+"))
    }
}
