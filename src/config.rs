use std::{
    env,
    path::{Path, PathBuf},
};

use directories::{BaseDirs, ProjectDirs};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::DisplayMode;

const CONFIG: &str = include_str!("../.config/config.json5");

/// File name looked up in the config directory when no `--config` path is given
pub const CONFIG_FILE_NAME: &str = "config.json5";

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

/// Analysis service endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub columns_path: String,
    pub analyze_path: String,
    pub health_path: String,
    /// Per-request timeout in seconds; `None` waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            columns_path: "/api/columns".to_string(),
            analyze_path: "/api/mi/shapley".to_string(),
            health_path: "/api/healthz".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub default_display_mode: DisplayMode,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_display_mode: DisplayMode::default(),
            theme: default_theme(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybindings_path: Option<PathBuf>,
}

impl Config {
    /// Layer the embedded defaults, a user file and `SHAPMI__*` environment variables
    ///
    /// An explicit `config_path` must exist; the implicit
    /// `<config_dir>/config.json5` is optional.
    pub fn from_path(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let (user_file, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => (get_config_dir().join(CONFIG_FILE_NAME), false),
        };
        Self::build(Some((user_file, required)), true)
    }

    /// Only the embedded defaults
    pub fn embedded() -> Result<Self, config::ConfigError> {
        Self::build(None, false)
    }

    fn build(
        user_file: Option<(PathBuf, bool)>,
        with_env: bool,
    ) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        if let Some((path, required)) = user_file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json5)
                    .required(required),
            );
        }
        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix(&PROJECT_NAME)
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }

    /// Directory holding per-session state
    pub fn session_base_dir(&self) -> PathBuf {
        match &self.session.dir {
            Some(dir) => expand_tilde(dir),
            None => self.data_dir.join("sessions"),
        }
    }

    pub fn keybindings_file(&self) -> Option<PathBuf> {
        self.keybindings_path.as_deref().map(expand_tilde)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix('~')
        && let Some(base) = BaseDirs::new()
    {
        return base
            .home_dir()
            .join(rest.trim_start_matches(['/', '\\']));
    }
    path.to_path_buf()
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}
