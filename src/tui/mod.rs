pub mod action;
pub mod app;
pub mod component;
pub mod components;
pub mod keybindings;
pub mod navigation;
pub mod terminal;
pub mod theme;

pub use action::{Action, ActionCategory};
pub use app::App;
pub use component::{ActionResult, Command, Component, Focusable};
pub use components::{FilePrompt, ResultsView, UploadView};
pub use keybindings::{KeyBinding, KeyBindings, KeyPattern};
pub use navigation::Navigator;
pub use theme::Theme;
