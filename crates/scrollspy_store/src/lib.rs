//! scrollspy UI State Store
//!
//! Holds the canonical [`UiState`] the view layer renders from:
//!
//! - active section, theme, menu open flag, revealed element ids
//! - header flags derived from the scroll position
//! - the project category filter
//!
//! All changes go through [`UiStore`] mutators, which dedupe no-op writes and
//! notify subscribers with owned snapshots. The menu is driven by a small
//! state machine ([`MenuMachine`]) and the theme preference is persisted
//! through a [`KeyValueStore`].
//!
//! # Example
//!
//! ```rust
//! use scrollspy_store::{MenuTrigger, ThemeMode, UiStore};
//!
//! let store = UiStore::in_memory();
//! let _sub = store.subscribe(|state| println!("theme is now {}", state.theme));
//!
//! store.set_theme(ThemeMode::Light);
//! store.toggle_menu();
//! store.close_menu(MenuTrigger::Escape);
//! assert!(!store.get_state().menu_open);
//! ```

pub mod error;
pub mod menu;
pub mod state;
pub mod storage;
pub mod store;

pub use error::{Result, StorageError};
pub use menu::{MenuMachine, MenuTrigger};
pub use state::{ProjectFilter, ThemeMode, UiState, UnknownTheme};
pub use storage::{JsonFileStorage, KeyValueStore, MemoryStorage, PreferenceFormat, UnknownFormat};
pub use store::UiStore;
