//! The UI state store
//!
//! Every mutation runs against a draft copy of the current state. The draft is
//! compared with the committed state field by field, and subscribers are only
//! notified when something actually changed.
//!
//! Notifications go through a FIFO queue. A subscriber that mutates the store
//! from inside its callback does not recurse: its snapshot is queued and
//! delivered once the current round has reached every subscriber.

use crate::menu::{MenuMachine, MenuTrigger};
use crate::state::{ProjectFilter, ThemeMode, UiState};
use crate::storage::{KeyValueStore, MemoryStorage, PreferenceFormat};
use parking_lot::Mutex;
use scrollspy_core::listeners::{ListenerSet, Subscription};
use std::collections::VecDeque;
use std::sync::Arc;

struct Committed {
    state: UiState,
    menu: MenuMachine,
}

#[derive(Default)]
struct Outbox {
    queue: VecDeque<UiState>,
    draining: bool,
}

/// Single source of truth for [`UiState`]
pub struct UiStore {
    committed: Mutex<Committed>,
    outbox: Mutex<Outbox>,
    listeners: ListenerSet<UiState>,
    storage: Arc<dyn KeyValueStore>,
    format: PreferenceFormat,
}

impl UiStore {
    /// Create a store, reading the persisted theme from `storage`
    pub fn new(storage: Arc<dyn KeyValueStore>, format: PreferenceFormat) -> Self {
        let theme = format.load(storage.as_ref());
        tracing::debug!(%theme, key = format.key(), "ui store initialized");
        Self {
            committed: Mutex::new(Committed {
                state: UiState::with_theme(theme),
                menu: MenuMachine::new(),
            }),
            outbox: Mutex::new(Outbox::default()),
            listeners: ListenerSet::new(),
            storage,
            format,
        }
    }

    /// Store backed by throwaway memory storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), PreferenceFormat::default())
    }

    /// Owned snapshot of the current state
    pub fn get_state(&self) -> UiState {
        self.committed.lock().state.clone()
    }

    pub fn theme(&self) -> ThemeMode {
        self.committed.lock().state.theme
    }

    pub fn is_menu_open(&self) -> bool {
        self.committed.lock().state.menu_open
    }

    /// Recent menu transitions as `(was_open, trigger, is_open)`
    pub fn menu_history(&self) -> Vec<(bool, MenuTrigger, bool)> {
        self.committed.lock().menu.history()
    }

    pub fn preference_format(&self) -> PreferenceFormat {
        self.format
    }

    /// Register a listener for committed changes.
    ///
    /// Listeners receive the full snapshot after each change, in commit
    /// order. A panicking listener is logged and skipped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&UiState) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every subscriber
    pub fn clear_subscribers(&self) {
        self.listeners.clear();
    }

    pub fn set_active_section(&self, id: Option<&str>) -> bool {
        self.commit(|draft, _| draft.active_section_id = id.map(str::to_string))
    }

    /// Set the theme and persist it.
    ///
    /// The preference is written on every call, even when the theme is
    /// unchanged. Write failures are logged and otherwise ignored.
    pub fn set_theme(&self, theme: ThemeMode) -> bool {
        let changed = self.commit(|draft, _| draft.theme = theme);
        self.persist_theme(theme);
        changed
    }

    pub fn toggle_theme(&self) -> bool {
        let mut theme = ThemeMode::default();
        let changed = self.commit(|draft, _| {
            draft.theme = draft.theme.toggled();
            theme = draft.theme;
        });
        self.persist_theme(theme);
        changed
    }

    pub fn toggle_menu(&self) -> bool {
        self.commit(|_, menu| {
            menu.fire(MenuTrigger::Toggle);
        })
    }

    /// Open or close the menu. Opening goes through the same transition as
    /// the toggle button.
    pub fn set_menu_open(&self, open: bool) -> bool {
        self.commit(|_, menu| {
            if menu.is_open() != open {
                menu.fire(MenuTrigger::Toggle);
            }
        })
    }

    /// Close the menu if it is open. Never opens it.
    pub fn close_menu(&self, trigger: MenuTrigger) -> bool {
        self.commit(|_, menu| {
            if menu.is_open() {
                menu.fire(trigger);
            }
        })
    }

    pub fn mark_revealed(&self, id: &str) -> bool {
        self.commit(|draft, _| {
            draft.revealed_ids.insert(id.to_string());
        })
    }

    pub fn unmark_revealed(&self, id: &str) -> bool {
        self.commit(|draft, _| {
            draft.revealed_ids.remove(id);
        })
    }

    /// Header flags derived from the raw scroll position
    pub fn set_scroll_flags(&self, scrolled: bool, show_scroll_top: bool) -> bool {
        self.commit(|draft, _| {
            draft.scrolled = scrolled;
            draft.show_scroll_top = show_scroll_top;
        })
    }

    pub fn set_project_filter(&self, filter: impl Into<String>) -> bool {
        let filter = ProjectFilter::new(filter);
        self.commit(|draft, _| draft.project_filter = filter)
    }

    /// Apply several field changes as one commit.
    ///
    /// Subscribers see either none or all of the changes. A change to
    /// `menu_open` is routed through the menu state machine; a theme change
    /// is persisted.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut UiState),
    {
        let mut theme_change = None;
        let changed = self.commit(|draft, menu| {
            let theme_before = draft.theme;
            f(draft);
            if draft.menu_open != menu.is_open() {
                menu.fire(MenuTrigger::Toggle);
            }
            if draft.theme != theme_before {
                theme_change = Some(draft.theme);
            }
        });
        if let Some(theme) = theme_change {
            self.persist_theme(theme);
        }
        changed
    }

    fn commit<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut UiState, &mut MenuMachine),
    {
        let mut committed = self.committed.lock();
        let Committed { state, menu } = &mut *committed;

        let mut draft = state.clone();
        mutate(&mut draft, menu);
        draft.menu_open = menu.is_open();

        if draft == *state {
            return false;
        }
        *state = draft.clone();

        // Queue while still holding the state lock so snapshots stay in
        // commit order across threads
        self.outbox.lock().queue.push_back(draft);
        drop(committed);

        self.drain();
        true
    }

    fn drain(&self) {
        {
            let mut outbox = self.outbox.lock();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let next = {
                let mut outbox = self.outbox.lock();
                match outbox.queue.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        outbox.draining = false;
                        break;
                    }
                }
            };
            self.listeners.emit(&next);
        }
    }

    fn persist_theme(&self, theme: ThemeMode) {
        if let Err(err) = self.format.save(self.storage.as_ref(), theme) {
            tracing::warn!(%theme, key = self.format.key(), error = %err, "failed to persist theme");
        }
    }
}

impl std::fmt::Debug for UiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiStore")
            .field("state", &self.committed.lock().state)
            .field("listeners", &self.listeners.len())
            .field("format", &self.format)
            .finish()
    }
}
