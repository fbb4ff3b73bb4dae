//! Key-value persistence for the theme preference

use crate::error::{Result, StorageError};
use crate::state::ThemeMode;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// String key-value store the preference is persisted through
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, the default when nothing is persisted
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Single JSON object file, rewritten on every `set`
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// Open `path`, treating a missing file as empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "opened preference file");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock();
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.write(&values) {
            // Keep memory in step with the file
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

/// How the theme preference is encoded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceFormat {
    /// `theme` = `"dark"` | `"light"`
    #[default]
    Theme,
    /// `darkMode` = `"true"` | `"false"`
    DarkMode,
}

impl PreferenceFormat {
    pub fn key(self) -> &'static str {
        match self {
            PreferenceFormat::Theme => "theme",
            PreferenceFormat::DarkMode => "darkMode",
        }
    }

    pub fn encode(self, theme: ThemeMode) -> &'static str {
        match (self, theme) {
            (PreferenceFormat::Theme, theme) => theme.as_str(),
            (PreferenceFormat::DarkMode, ThemeMode::Dark) => "true",
            (PreferenceFormat::DarkMode, ThemeMode::Light) => "false",
        }
    }

    pub fn decode(self, value: &str) -> Option<ThemeMode> {
        match self {
            PreferenceFormat::Theme => value.parse().ok(),
            PreferenceFormat::DarkMode => match value.trim() {
                "true" => Some(ThemeMode::Dark),
                "false" => Some(ThemeMode::Light),
                _ => None,
            },
        }
    }

    /// Read the stored theme, falling back to `Dark`
    pub fn load(self, storage: &dyn KeyValueStore) -> ThemeMode {
        let Some(value) = storage.get(self.key()) else {
            return ThemeMode::default();
        };
        self.decode(&value).unwrap_or_else(|| {
            tracing::warn!(key = self.key(), %value, "unrecognized stored theme, using default");
            ThemeMode::default()
        })
    }

    pub fn save(self, storage: &dyn KeyValueStore, theme: ThemeMode) -> Result<()> {
        storage.set(self.key(), self.encode(theme))
    }
}

/// Unrecognized preference format name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preference format `{0}` (expected `theme` or `dark_mode`)")]
pub struct UnknownFormat(pub String);

impl std::str::FromStr for PreferenceFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "theme" => Ok(PreferenceFormat::Theme),
            "dark_mode" | "darkMode" => Ok(PreferenceFormat::DarkMode),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formats_round_trip_through_memory() {
        for format in [PreferenceFormat::Theme, PreferenceFormat::DarkMode] {
            let storage = MemoryStorage::new();
            assert_eq!(format.load(&storage), ThemeMode::Dark);
            format.save(&storage, ThemeMode::Light).unwrap();
            assert_eq!(format.load(&storage), ThemeMode::Light);
        }
    }

    #[test]
    fn test_encodings() {
        let storage = MemoryStorage::new();
        PreferenceFormat::DarkMode
            .save(&storage, ThemeMode::Light)
            .unwrap();
        assert_eq!(storage.get("darkMode").as_deref(), Some("false"));

        PreferenceFormat::Theme.save(&storage, ThemeMode::Dark).unwrap();
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_unknown_value_falls_back_to_dark() {
        let storage = MemoryStorage::with_entries([("theme", "sepia"), ("darkMode", "yes")]);
        assert_eq!(PreferenceFormat::Theme.load(&storage), ThemeMode::Dark);
        assert_eq!(PreferenceFormat::DarkMode.load(&storage), ThemeMode::Dark);
    }

    #[test]
    fn test_json_file_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("ui.json");

        let storage = JsonFileStorage::open(&path).unwrap();
        assert_eq!(storage.get("theme"), None);
        storage.set("theme", "light").unwrap();

        let reopened = JsonFileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_json_file_storage_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStorage::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed(_)));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("dark_mode".parse::<PreferenceFormat>().unwrap(), PreferenceFormat::DarkMode);
        assert_eq!("theme".parse::<PreferenceFormat>().unwrap(), PreferenceFormat::Theme);
        assert_eq!(
            "cookie".parse::<PreferenceFormat>(),
            Err(UnknownFormat("cookie".to_string()))
        );
    }
}
