use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Log file used when no path is given: `<data_dir>/shapmi.log`
pub fn default_log_path() -> PathBuf {
    crate::config::get_data_dir().join(LOG_FILE.as_str())
}

/// Initialize logging with default settings (WARN level)
pub fn init() -> Result<()> {
    init_with(None, None)
}

/// Initialize logging with custom path and/or level
///
/// The terminal belongs to the UI, so everything goes to the file. An
/// explicit `level` wins over `RUST_LOG`; with neither the filter is WARN.
pub fn init_with(custom_log_path: Option<PathBuf>, level: Option<tracing::Level>) -> Result<()> {
    let log_path = custom_log_path.unwrap_or_else(default_log_path);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = match level {
        Some(lvl) => EnvFilter::builder()
            .with_default_directive(lvl.into())
            .parse_lossy(""),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy(),
    };

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_is_in_data_dir() {
        let path = default_log_path();
        assert_eq!(path.file_name().unwrap(), "shapmi.log");
        assert_eq!(path.parent().unwrap(), crate::config::get_data_dir());
    }
}
