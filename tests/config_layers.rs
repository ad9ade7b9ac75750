use pretty_assertions::assert_eq;
use shapmi::config::Config;
use shapmi::core::DisplayMode;
use shapmi::tui::{KeyBindings, Theme};
use std::io::Write;

#[test]
fn test_user_file_overrides_embedded_defaults() {
    let mut file = tempfile::Builder::new().suffix(".json5").tempfile().unwrap();
    writeln!(
        file,
        r#"{{
            // Only what differs from the defaults
            api: {{ base_url: "http://analysis.internal:9000", timeout_secs: 30 }},
            ui: {{ default_display_mode: "absolute", theme: "light" }},
        }}"#
    )
    .unwrap();

    let config = Config::from_path(Some(file.path())).unwrap();
    assert_eq!(config.api.base_url, "http://analysis.internal:9000");
    assert_eq!(config.api.timeout_secs, Some(30));
    assert_eq!(config.api.analyze_path, "/api/mi/shapley");
    assert_eq!(config.ui.default_display_mode, DisplayMode::Absolute);
    assert_eq!(Theme::by_name(&config.ui.theme).name, "light");
}

#[test]
fn test_keybindings_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.json");
    let bindings = KeyBindings::default();
    bindings.save_to_file(&path).unwrap();

    let loaded = KeyBindings::load_from_file(&path).unwrap();
    assert!(loaded.validate().is_empty());
    assert_eq!(
        loaded.get_keys_for_action(shapmi::Action::Quit),
        bindings.get_keys_for_action(shapmi::Action::Quit)
    );
}
