//! UI state snapshot types

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color scheme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized theme name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}` (expected `light` or `dark`)")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// Project category filter. `"all"` matches every category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFilter(String);

impl ProjectFilter {
    pub const ALL: &'static str = "all";

    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        if category.trim().is_empty() {
            Self::default()
        } else {
            Self(category)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    pub fn matches(&self, category: &str) -> bool {
        self.is_all() || self.0 == category
    }
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self(Self::ALL.to_string())
    }
}

impl fmt::Display for ProjectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of everything the view layer renders from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    /// Section highlighted in the navigation
    pub active_section_id: Option<String>,
    pub theme: ThemeMode,
    /// Mobile navigation menu
    pub menu_open: bool,
    /// Elements whose reveal animation has been triggered
    pub revealed_ids: FxHashSet<String>,
    /// Page scrolled past the header threshold
    pub scrolled: bool,
    /// "Back to top" button visible
    pub show_scroll_top: bool,
    pub project_filter: ProjectFilter,
}

impl UiState {
    pub fn with_theme(theme: ThemeMode) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed_ids.contains(id)
    }

    /// Revealed ids in sorted order, for stable output
    pub fn revealed_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.revealed_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_theme_parsing() {
        assert_eq!("light".parse(), Ok(ThemeMode::Light));
        assert_eq!(" Dark ".parse(), Ok(ThemeMode::Dark));
        assert!("sepia".parse::<ThemeMode>().is_err());
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.to_string(), "dark");
    }

    #[test]
    fn test_project_filter() {
        let all = ProjectFilter::default();
        assert!(all.matches("web"));
        assert!(all.matches("mobile"));

        let web = ProjectFilter::new("web");
        assert!(web.matches("web"));
        assert!(!web.matches("mobile"));

        assert!(ProjectFilter::new("  ").is_all());
    }

    #[test]
    fn test_default_state() {
        let state = UiState::default();
        assert_eq!(state.active_section_id, None);
        assert_eq!(state.theme, ThemeMode::Dark);
        assert!(!state.menu_open);
        assert!(state.revealed_ids.is_empty());
        assert_eq!(state.project_filter.as_str(), "all");
    }

    #[test]
    fn test_serializes_for_reports() {
        let mut state = UiState::with_theme(ThemeMode::Light);
        state.active_section_id = Some("about".into());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["active_section_id"], "about");
        assert_eq!(json["project_filter"], "all");
    }
}
