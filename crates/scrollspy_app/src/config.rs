//! Engine configuration (scrollspy.toml)

use scrollspy_observe::{RootMargin, VisibilityOptions};
use scrollspy_store::{JsonFileStorage, KeyValueStore, MemoryStorage, PreferenceFormat, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level engine configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scroll: ScrollConfig,
    pub layout: LayoutConfig,
    pub reveal: RevealConfig,
    pub storage: StorageConfig,
}

/// Scroll handling and header thresholds
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Minimum spacing of leading-edge resolver passes
    pub throttle_ms: u64,
    /// Quiet period before the trailing settle pass
    pub settle_ms: u64,
    /// Added to the scroll position before resolving the active section
    pub viewport_offset: f64,
    /// Header switches to its scrolled style past this position
    pub scrolled_threshold: f64,
    /// "Back to top" appears past this position
    pub scroll_top_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            settle_ms: 100,
            viewport_offset: 100.0,
            scrolled_threshold: 50.0,
            scroll_top_threshold: 300.0,
        }
    }
}

impl ScrollConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Widths above this close the mobile menu
    pub mobile_breakpoint: f64,
    /// Fixed header height subtracted from nav-link scroll targets
    pub header_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            header_height: 64.0,
        }
    }
}

/// Defaults for elements registered without explicit options
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub latch: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::new(0.0, 0.0, -50.0, 0.0),
            latch: true,
        }
    }
}

impl RevealConfig {
    pub fn options(&self) -> VisibilityOptions {
        VisibilityOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
            latch: self.latch,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub format: PreferenceFormat,
    /// Preference file; in-memory storage when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Open the configured preference storage
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        match &self.path {
            Some(path) => Ok(Arc::new(JsonFileStorage::open(path)?)),
            None => Ok(Arc::new(MemoryStorage::new())),
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        let finite = [
            ("scroll.viewport_offset", self.scroll.viewport_offset),
            ("scroll.scrolled_threshold", self.scroll.scrolled_threshold),
            ("scroll.scroll_top_threshold", self.scroll.scroll_top_threshold),
            ("layout.mobile_breakpoint", self.layout.mobile_breakpoint),
            ("layout.header_height", self.layout.header_height),
            ("reveal.threshold", self.reveal.threshold),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        if self.scroll.throttle_ms == 0 {
            return Err(invalid("scroll.throttle_ms", "must be at least 1"));
        }
        if self.scroll.settle_ms == 0 {
            return Err(invalid("scroll.settle_ms", "must be at least 1"));
        }
        if self.layout.mobile_breakpoint <= 0.0 {
            return Err(invalid("layout.mobile_breakpoint", "must be positive"));
        }
        if self.layout.header_height < 0.0 {
            return Err(invalid("layout.header_height", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(invalid(
                "reveal.threshold",
                format!("{} is outside 0.0..=1.0", self.reveal.threshold),
            ));
        }
        Ok(())
    }
}
