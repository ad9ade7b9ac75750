use clap::{Parser, ValueEnum};
use color_eyre::{Result, eyre::WrapErr};
use crossterm::event::EventStream;
use futures::StreamExt;
use shapmi::config::{Config, expand_tilde};
use shapmi::services::{AnalysisClient, FileSessionStorage, ResultStore, prune_stale_sessions};
use shapmi::tui::{App, KeyBindings, Theme, terminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Keyboard-first terminal client for information-decomposition analysis
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Base URL of the analysis service (overrides api.base_url)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,
    /// Dataset to select on startup
    #[arg(long = "file", value_name = "PATH")]
    file: Option<PathBuf>,
    /// Open the results view with the last result of this session
    #[arg(long = "results", conflicts_with = "file")]
    results: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn load_keybindings(config: &Config) -> KeyBindings {
    let Some(path) = config.keybindings_file() else {
        return KeyBindings::default();
    };
    if !path.exists() {
        debug!("No keybindings file at {}", path.display());
        return KeyBindings::default();
    }
    match KeyBindings::load_from_file(&path) {
        Ok(bindings) => {
            for problem in bindings.validate() {
                warn!("Keybindings: {problem}");
            }
            bindings
        }
        Err(e) => {
            warn!("Ignoring keybindings file {}: {e}", path.display());
            KeyBindings::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    shapmi::errors::init()?;
    shapmi::logging::init_with(None, args.logging.map(Into::into))?;

    let mut config = Config::from_path(args.config.as_deref()).wrap_err("Failed to load config")?;
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    info!("Analysis service at {}", config.api.base_url);

    let keybindings = load_keybindings(&config);
    let theme = Theme::by_name(&config.ui.theme);
    let session_base = config.session_base_dir();
    let pruned = prune_stale_sessions(&session_base);
    if pruned > 0 {
        info!("Removed {pruned} session(s) left by closed shells");
    }
    let storage = FileSessionStorage::for_current_session(&session_base);
    debug!("Session storage in {}", storage.dir().display());
    let store = ResultStore::new(storage);
    let client = AnalysisClient::new(config.api.clone()).wrap_err("Failed to build HTTP client")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(Arc::new(client), store, tx);
    app.set_theme(theme);
    app.set_keybindings(keybindings);
    app.set_default_mode(config.ui.default_display_mode);

    if let Some(path) = &args.file {
        app.open_path(&expand_tilde(path));
    } else if args.results {
        app.show_results(None);
    }

    let mut tui = terminal::init()?;
    let outcome = run(&mut app, &mut tui, &mut rx, config.ui.tick_rate_ms).await;
    terminal::restore()?;
    if let Err(e) = &outcome {
        error!("Event loop failed: {e:?}");
    }
    outcome
}

async fn run(
    app: &mut App<AnalysisClient>,
    tui: &mut terminal::Tui,
    rx: &mut mpsc::UnboundedReceiver<shapmi::services::ServiceEvent>,
    tick_rate_ms: u64,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_rate_ms.max(1)));

    loop {
        tui.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => app.handle_event(event)?,
                Some(Err(e)) => return Err(e).wrap_err("Failed to read terminal event"),
                None => break,
            },
            Some(service_event) = rx.recv() => app.handle_service_event(service_event),
            _ = ticker.tick() => app.update()?,
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
