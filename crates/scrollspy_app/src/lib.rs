//! scrollspy Engine
//!
//! Wires the scheduler, observers and UI store into a [`ScrollEngine`] the
//! view layer drives with raw input:
//!
//! ```text
//! raw events -> throttle / debounce -> resolver, tracker -> UiStore -> view
//! ```
//!
//! Also provides the engine configuration ([`EngineConfig`], TOML), contact
//! form validation, and a headless scenario runner for replaying scripted
//! input.
//!
//! # Example
//!
//! ```rust
//! use scrollspy_app::{EngineConfig, ScrollEngine};
//! use scrollspy_observe::Section;
//! use scrollspy_scheduler::ManualClock;
//! use scrollspy_store::MemoryStorage;
//! use std::sync::Arc;
//!
//! let engine = ScrollEngine::new(
//!     EngineConfig::default(),
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(ManualClock::new()),
//! )?;
//! engine.mount(
//!     vec![Section::new("home", 0.0, 800.0), Section::new("about", 800.0, 600.0)],
//!     ["hero"],
//! );
//!
//! engine.on_scroll(750.0);
//! assert_eq!(engine.state().active_section_id.as_deref(), Some("about"));
//! # Ok::<(), scrollspy_app::ConfigError>(())
//! ```

pub mod config;
pub mod contact;
pub mod engine;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::{ConfigError, EngineConfig, LayoutConfig, RevealConfig, ScrollConfig, StorageConfig};
pub use contact::{validate_field, ContactForm, Field, FieldError};
pub use engine::ScrollEngine;
pub use report::{AssertionFailure, ReportStatus, ScenarioReport};
pub use runner::{run_loaded_scenario, run_scenario, ReplayConfig};
pub use scenario::{ElementSpec, Scenario, ScenarioStep};
