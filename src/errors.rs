//! Error and panic reporting for the binary.

use crate::tui::terminal;
use color_eyre::Result;
use tracing::error;

/// Install color-eyre reporting and a panic hook that restores the terminal first
pub fn init() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Rerun with `--logging debug` and attach {}",
            crate::config::get_data_dir().join(crate::logging::LOG_FILE.as_str()).display()
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::restore() {
            error!("Unable to restore the terminal: {e:?}");
        }

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{Metadata, handle_dump, print_msg};
            let metadata = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            let file_path = handle_dump(&metadata, panic_info);
            if let Err(e) = print_msg(file_path, &metadata) {
                eprintln!("{e}");
            }
        }

        let msg = format!("{}", panic_hook.panic_report(panic_info));
        error!("Panic: {}", strip_trailing_newline(&msg));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(1);
    }));
    Ok(())
}

fn strip_trailing_newline(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}
