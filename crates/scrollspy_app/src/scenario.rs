//! Scripted input scenarios for headless replay.

use crate::config::EngineConfig;
use anyhow::{Context, Result};
use scrollspy_observe::{Rect, RootMargin, Section, VisibilityOptions};
use scrollspy_store::ThemeMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A page layout plus a sequence of input and assertion steps.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Overrides the default engine configuration
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// A reveal target: a bare id, or an id with option overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElementSpec {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        threshold: Option<f64>,
        #[serde(default)]
        root_margin: Option<RootMargin>,
        #[serde(default)]
        latch: Option<bool>,
    },
}

impl ElementSpec {
    pub fn id(&self) -> &str {
        match self {
            ElementSpec::Id(id) | ElementSpec::Detailed { id, .. } => id,
        }
    }

    /// Options for this element, starting from `defaults`
    pub fn options(&self, defaults: VisibilityOptions) -> VisibilityOptions {
        match self {
            ElementSpec::Id(_) => defaults,
            ElementSpec::Detailed {
                threshold,
                root_margin,
                latch,
                ..
            } => VisibilityOptions {
                threshold: threshold.unwrap_or(defaults.threshold),
                root_margin: root_margin.unwrap_or(defaults.root_margin),
                latch: latch.unwrap_or(defaults.latch),
            },
        }
    }
}

fn default_true() -> bool {
    true
}

/// Scenario step set.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    Scroll {
        y: f64,
    },
    /// Resize, optionally with recomputed section offsets
    Resize {
        width: f64,
        height: f64,
        #[serde(default)]
        sections: Option<Vec<Section>>,
    },
    /// Advance the clock, running timers as they come due
    Wait {
        ms: u64,
    },
    Visibility {
        viewport: Rect,
        #[serde(default)]
        bounds: BTreeMap<String, Rect>,
    },
    /// Key press by DOM key name, e.g. `"Escape"`
    Key {
        key: String,
    },
    PointerDown {
        #[serde(default)]
        inside_menu: bool,
    },
    NavLink {
        id: String,
    },
    ToggleTheme,
    ToggleMenu,
    SetFilter {
        filter: String,
    },
    AssertActive {
        id: Option<String>,
    },
    AssertRevealed {
        id: String,
        #[serde(default = "default_true")]
        revealed: bool,
    },
    AssertMenu {
        open: bool,
    },
    AssertTheme {
        theme: ThemeMode,
    },
    AssertHeader {
        #[serde(default)]
        scrolled: Option<bool>,
        #[serde(default)]
        show_scroll_top: Option<bool>,
    },
}

impl ScenarioStep {
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            ScenarioStep::AssertActive { .. }
                | ScenarioStep::AssertRevealed { .. }
                | ScenarioStep::AssertMenu { .. }
                | ScenarioStep::AssertTheme { .. }
                | ScenarioStep::AssertHeader { .. }
        )
    }
}
