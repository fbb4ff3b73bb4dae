//! Theme preference persistence across store instances

use pretty_assertions::assert_eq;
use scrollspy_store::{JsonFileStorage, KeyValueStore, PreferenceFormat, ThemeMode, UiStore};
use std::sync::Arc;

fn file_store(path: &std::path::Path, format: PreferenceFormat) -> UiStore {
    let storage = JsonFileStorage::open(path).expect("open preference file");
    UiStore::new(Arc::new(storage), format)
}

#[test]
fn test_theme_survives_restart_in_both_formats() {
    for format in [PreferenceFormat::Theme, PreferenceFormat::DarkMode] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let store = file_store(&path, format);
        assert_eq!(store.theme(), ThemeMode::Dark);
        store.set_theme(ThemeMode::Light);
        drop(store);

        let restarted = file_store(&path, format);
        assert_eq!(restarted.theme(), ThemeMode::Light, "{format:?}");
        assert_eq!(restarted.get_state().theme, ThemeMode::Light);
    }
}

#[test]
fn test_file_contents_use_legacy_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let store = file_store(&path, PreferenceFormat::DarkMode);
    store.toggle_theme();

    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["darkMode"], "false");
}

#[test]
fn test_foreign_keys_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, r#"{"language": "en", "theme": "light"}"#).unwrap();

    let storage = Arc::new(JsonFileStorage::open(&path).unwrap());
    let store = UiStore::new(storage.clone(), PreferenceFormat::Theme);
    assert_eq!(store.theme(), ThemeMode::Light);

    store.set_theme(ThemeMode::Dark);
    let reopened = JsonFileStorage::open(&path).unwrap();
    assert_eq!(reopened.get("language").as_deref(), Some("en"));
    assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
}
