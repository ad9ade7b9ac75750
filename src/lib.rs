pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod services;
pub mod tui;
pub mod viz;

// Re-export commonly used types
pub use config::Config;
pub use core::{AnalysisResult, DatasetRef, DisplayMode, View};
pub use services::{AnalysisClient, AnalysisService, ResultStore};
pub use tui::{Action, ActionCategory, App};
