//! The scroll engine
//!
//! Owns one scheduler, one section resolver, one visibility tracker and one
//! UI store, and exposes the entry points a host calls with raw input.
//!
//! Scroll input takes two paths. A throttle runs the resolver on the leading
//! edge of a burst so highlighting keeps up while scrolling, and a debounced
//! settle pass runs it again once scrolling stops so the final resting
//! position is always resolved, even when the throttle dropped the last raw
//! event.

use crate::config::{ConfigError, EngineConfig};
use parking_lot::Mutex;
use scrollspy_core::events::{event_types, Event, EventData, KeyCode};
use scrollspy_core::listeners::Subscription;
use scrollspy_observe::{
    ActiveChange, Rect, Section, SectionResolver, VisibilityEvent, VisibilityOptions, VisibilityTracker,
};
use scrollspy_scheduler::{Clock, Debouncer, Scheduler, Throttler};
use scrollspy_store::{KeyValueStore, MenuTrigger, ThemeMode, UiState, UiStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scroll-driven UI state engine
pub struct ScrollEngine {
    config: EngineConfig,
    scheduler: Scheduler,
    store: Arc<UiStore>,
    resolver: Arc<Mutex<SectionResolver>>,
    tracker: Mutex<VisibilityTracker>,
    throttled: Throttler<f64, Option<ActiveChange>>,
    settle: Debouncer<f64>,
    last_scroll_y: Mutex<Option<f64>>,
    viewport: Mutex<Option<(f64, f64)>>,
    torn_down: AtomicBool,
}

/// Run the resolver at `scroll_y` and publish a changed active id
fn resolve_active(
    resolver: &Mutex<SectionResolver>,
    store: &UiStore,
    scroll_y: f64,
    viewport_offset: f64,
) {
    let change = resolver.lock().on_scroll(scroll_y, viewport_offset);
    if let Some(change) = change {
        store.set_active_section(change.current.as_deref());
    }
}

impl ScrollEngine {
    /// Create an engine. The configuration is validated first.
    pub fn new(
        config: EngineConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let scheduler = Scheduler::new(clock);
        let store = Arc::new(UiStore::new(storage, config.storage.format));
        let resolver = Arc::new(Mutex::new(SectionResolver::new()));
        let offset = config.scroll.viewport_offset;

        let throttled = {
            let resolver = resolver.clone();
            scheduler.throttle(config.scroll.throttle(), move |scroll_y: f64| {
                resolver.lock().on_scroll(scroll_y, offset)
            })
        };
        let settle = {
            let resolver = resolver.clone();
            let store = store.clone();
            scheduler.debounce(config.scroll.settle(), move |scroll_y: f64| {
                tracing::trace!(scroll_y, "settle pass");
                resolve_active(&resolver, &store, scroll_y, offset);
            })
        };

        tracing::debug!(
            throttle_ms = config.scroll.throttle_ms,
            settle_ms = config.scroll.settle_ms,
            theme = %store.theme(),
            "scroll engine created"
        );

        Ok(Self {
            config,
            scheduler,
            store,
            resolver,
            tracker: Mutex::new(VisibilityTracker::new()),
            throttled,
            settle,
            last_scroll_y: Mutex::new(None),
            viewport: Mutex::new(None),
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &Arc<UiStore> {
        &self.store
    }

    /// Snapshot of the current UI state
    pub fn state(&self) -> UiState {
        self.store.get_state()
    }

    /// Subscribe to UI state changes
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&UiState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    pub fn last_scroll_y(&self) -> Option<f64> {
        *self.last_scroll_y.lock()
    }

    pub fn viewport_size(&self) -> Option<(f64, f64)> {
        *self.viewport.lock()
    }

    /// Register the page's sections and reveal targets.
    ///
    /// Elements use the configured reveal defaults; use
    /// [`register_element`](Self::register_element) for per-element options.
    pub fn mount<I, S>(&self, sections: Vec<Section>, elements: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.is_torn_down() {
            return;
        }
        self.resolver.lock().register_sections(sections);
        let options = self.config.reveal.options();
        for id in elements {
            self.register_element(id, options);
        }
    }

    pub fn register_element(&self, id: impl Into<String>, options: VisibilityOptions) {
        if self.is_torn_down() {
            return;
        }
        let id = id.into();
        let previous = self.tracker.lock().register(id.clone(), options);
        if previous.is_some_and(|element| element.revealed) {
            self.store.unmark_revealed(&id);
        }
    }

    /// Stop tracking an element. Latched reveals stay in the state.
    pub fn unregister_element(&self, id: &str) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let removed = {
            let mut tracker = self.tracker.lock();
            let latched = tracker.get(id).map(|element| element.latch());
            tracker.unregister(id);
            latched
        };
        match removed {
            Some(false) => {
                self.store.unmark_revealed(id);
                true
            }
            Some(true) => true,
            None => false,
        }
    }

    /// Raw scroll position from the host.
    ///
    /// The header flags and a leading-edge active section change land in one
    /// commit.
    pub fn on_scroll(&self, scroll_y: f64) {
        if self.is_torn_down() {
            return;
        }
        if !scroll_y.is_finite() {
            tracing::debug!(scroll_y, "ignoring non-finite scroll position");
            return;
        }
        *self.last_scroll_y.lock() = Some(scroll_y);

        let change = self.throttled.call(scroll_y).flatten();
        self.settle.call(scroll_y);

        let scroll = &self.config.scroll;
        let scrolled = scroll_y > scroll.scrolled_threshold;
        let show_scroll_top = scroll_y > scroll.scroll_top_threshold;
        self.store.update(|draft| {
            if let Some(change) = change {
                draft.active_section_id = change.current;
            }
            draft.scrolled = scrolled;
            draft.show_scroll_top = show_scroll_top;
        });
    }

    /// Viewport resized; `sections` are the recomputed section offsets
    pub fn on_resize(&self, width: f64, height: f64, sections: Vec<Section>) {
        if self.is_torn_down() {
            return;
        }
        self.settle.cancel();
        let previous = self.viewport.lock().replace((width, height));
        self.resolver.lock().register_sections(sections);

        if let Some(scroll_y) = self.last_scroll_y() {
            resolve_active(
                &self.resolver,
                &self.store,
                scroll_y,
                self.config.scroll.viewport_offset,
            );
        }

        let breakpoint = self.config.layout.mobile_breakpoint;
        let was_mobile = previous.map_or(true, |(previous_width, _)| previous_width <= breakpoint);
        if was_mobile && width > breakpoint {
            self.store.close_menu(MenuTrigger::BreakpointExceeded);
        }
        tracing::debug!(width, height, "viewport resized");
    }

    /// Run one intersection pass and mirror the results into the state
    pub fn on_visibility_pass<F>(&self, viewport: Rect, bounds: F) -> Vec<VisibilityEvent>
    where
        F: FnMut(&str) -> Option<Rect>,
    {
        if self.is_torn_down() {
            return Vec::new();
        }
        let events = self.tracker.lock().observe(viewport, bounds);
        for event in &events {
            match event {
                VisibilityEvent::Revealed(id) => self.store.mark_revealed(id),
                VisibilityEvent::Hidden(id) => self.store.unmark_revealed(id),
            };
        }
        events
    }

    /// Key press. Escape closes the menu.
    pub fn on_key(&self, key: KeyCode) -> bool {
        if self.is_torn_down() || key != KeyCode::Escape {
            return false;
        }
        self.store.close_menu(MenuTrigger::Escape)
    }

    /// Pointer press. A press outside the menu closes it.
    pub fn on_pointer_down(&self, inside_menu: bool) -> bool {
        if self.is_torn_down() || inside_menu {
            return false;
        }
        self.store.close_menu(MenuTrigger::OutsideClick)
    }

    /// Navigation link followed.
    ///
    /// Closes the menu and marks the section active right away. Returns the
    /// offset to scroll to, or `None` for an unknown section.
    pub fn on_nav_link(&self, section_id: &str) -> Option<f64> {
        if self.is_torn_down() {
            return None;
        }
        self.store.close_menu(MenuTrigger::NavLink);

        let target = {
            let mut resolver = self.resolver.lock();
            let target = resolver.scroll_target(section_id, self.config.layout.header_height);
            if target.is_some() {
                resolver.sync_active(Some(section_id));
            }
            target
        };
        match target {
            Some(_) => {
                self.store.set_active_section(Some(section_id));
            }
            None => tracing::debug!(%section_id, "nav link to unknown section"),
        }
        target
    }

    pub fn toggle_theme(&self) -> bool {
        !self.is_torn_down() && self.store.toggle_theme()
    }

    pub fn set_theme(&self, theme: ThemeMode) -> bool {
        !self.is_torn_down() && self.store.set_theme(theme)
    }

    pub fn toggle_menu(&self) -> bool {
        !self.is_torn_down() && self.store.toggle_menu()
    }

    pub fn set_project_filter(&self, filter: &str) -> bool {
        !self.is_torn_down() && self.store.set_project_filter(filter)
    }

    /// Route a core input event to the matching entry point.
    ///
    /// Returns `false` for events the engine does not handle.
    pub fn handle_event(&self, event: &Event) -> bool {
        if self.is_torn_down() {
            return false;
        }
        match (&event.data, event.event_type) {
            (EventData::Scroll { scroll_y }, _) => self.on_scroll(*scroll_y),
            (EventData::Resize { width, height }, _) => {
                let sections = self.resolver.lock().sections().to_vec();
                self.on_resize(*width, *height, sections);
            }
            (EventData::Key { key, .. }, event_types::KEY_DOWN) => {
                self.on_key(*key);
            }
            (EventData::Pointer { inside_menu, .. }, event_types::POINTER_DOWN) => {
                self.on_pointer_down(*inside_menu);
            }
            (EventData::NavLink { section_id }, _) => {
                self.on_nav_link(section_id);
            }
            (_, event_types::THEME_TOGGLE) => {
                self.toggle_theme();
            }
            (_, event_types::MENU_TOGGLE) => {
                self.toggle_menu();
            }
            (_, event_types::UNMOUNT) => self.teardown(),
            _ => {
                tracing::trace!(event_type = event.event_type, "unhandled event");
                return false;
            }
        }
        true
    }

    /// Run timers that are due; returns how many ran
    pub fn tick(&self) -> usize {
        self.scheduler.run_due()
    }

    /// Stop everything. Pending timers are dropped, later input is ignored
    /// and subscribers are released. Safe to call more than once.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.settle.cancel();
        self.throttled.close();
        self.scheduler.shutdown();
        self.store.clear_subscribers();
        self.tracker.lock().clear();
        self.resolver.lock().clear();
        tracing::debug!("scroll engine torn down");
    }
}

impl Drop for ScrollEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for ScrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEngine")
            .field("torn_down", &self.is_torn_down())
            .field("last_scroll_y", &self.last_scroll_y())
            .field("pending_timers", &self.scheduler.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scrollspy_scheduler::ManualClock;
    use scrollspy_store::MemoryStorage;
    use std::time::Duration;

    fn sections() -> Vec<Section> {
        vec![
            Section::new("home", 0.0, 800.0),
            Section::new("about", 800.0, 700.0),
            Section::new("projects", 1500.0, 1000.0),
            Section::new("contact", 2500.0, 600.0),
        ]
    }

    fn engine() -> (ScrollEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine = ScrollEngine::new(
            EngineConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(clock.clone()),
        )
        .unwrap();
        engine.mount(sections(), ["hero", "card"]);
        (engine, clock)
    }

    fn advance(engine: &ScrollEngine, clock: &ManualClock, ms: u64) {
        clock.advance(Duration::from_millis(ms));
        engine.tick();
    }

    #[test]
    fn test_leading_edge_resolves_immediately() {
        let (engine, _clock) = engine();
        engine.on_scroll(900.0);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("about"));
        assert!(engine.state().scrolled);
        assert!(engine.state().show_scroll_top);
    }

    #[test]
    fn test_settle_pass_resolves_dropped_final_position() {
        let (engine, clock) = engine();
        engine.on_scroll(0.0);
        advance(&engine, &clock, 16);
        // Dropped by the throttle
        engine.on_scroll(1600.0);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("home"));

        advance(&engine, &clock, 100);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("projects"));
    }

    #[test]
    fn test_resize_reresolves_and_closes_menu() {
        let (engine, clock) = engine();
        engine.on_scroll(900.0);
        engine.toggle_menu();
        assert!(engine.state().menu_open);

        // Narrow resize keeps the menu, sections shift down
        engine.on_resize(
            600.0,
            800.0,
            vec![Section::new("home", 0.0, 1200.0), Section::new("about", 1200.0, 800.0)],
        );
        assert_eq!(engine.state().active_section_id.as_deref(), Some("home"));
        assert!(engine.state().menu_open);
        // The pending settle pass was cancelled
        assert_eq!(engine.tick(), 0);
        advance(&engine, &clock, 500);

        engine.on_resize(1024.0, 800.0, sections());
        assert!(!engine.state().menu_open);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("about"));
    }

    #[test]
    fn test_one_scroll_event_is_one_commit() {
        let (engine, _clock) = engine();
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();
        let _subscription = engine.subscribe(move |state| {
            sink.lock().push((
                state.active_section_id.clone(),
                state.scrolled,
                state.show_scroll_top,
            ))
        });

        engine.on_scroll(900.0);
        assert_eq!(
            *snapshots.lock(),
            vec![(Some("about".to_string()), true, true)]
        );
    }

    #[test]
    fn test_menu_closes_only_when_crossing_breakpoint() {
        let (engine, _clock) = engine();
        engine.on_resize(1024.0, 800.0, sections());
        engine.toggle_menu();

        // Already wide; growing further keeps the menu open
        engine.on_resize(1280.0, 800.0, sections());
        assert!(engine.state().menu_open);

        engine.on_resize(600.0, 800.0, sections());
        assert!(engine.state().menu_open);
        engine.on_resize(769.0, 800.0, sections());
        assert!(!engine.state().menu_open);
        assert_eq!(engine.viewport_size(), Some((769.0, 800.0)));
    }

    #[test]
    fn test_nav_link_is_optimistic() {
        let (engine, clock) = engine();
        engine.toggle_menu();
        let target = engine.on_nav_link("projects");
        assert_eq!(target, Some(1436.0));

        let state = engine.state();
        assert_eq!(state.active_section_id.as_deref(), Some("projects"));
        assert!(!state.menu_open);

        // Smooth scroll lands on the target; no duplicate change afterwards
        let notifications = Arc::new(Mutex::new(0));
        let counter = notifications.clone();
        let _sub = engine.subscribe(move |_| *counter.lock() += 1);
        engine.on_scroll(1436.0);
        advance(&engine, &clock, 200);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("projects"));
        // Only the header flags changed
        assert_eq!(*notifications.lock(), 1);
    }

    #[test]
    fn test_nav_link_to_unknown_section() {
        let (engine, _clock) = engine();
        assert_eq!(engine.on_nav_link("missing"), None);
        assert_eq!(engine.state().active_section_id, None);
    }

    #[test]
    fn test_keys_and_pointer_close_menu() {
        let (engine, _clock) = engine();
        engine.toggle_menu();
        assert!(!engine.on_key(KeyCode::Enter));
        assert!(engine.on_key(KeyCode::Escape));

        engine.toggle_menu();
        assert!(!engine.on_pointer_down(true));
        assert!(engine.on_pointer_down(false));
        assert!(!engine.state().menu_open);
    }

    #[test]
    fn test_visibility_pass_updates_revealed_ids() {
        let (engine, _clock) = engine();
        let bounds = |id: &str| match id {
            "hero" => Some(Rect::new(0.0, 100.0, 500.0, 200.0)),
            "card" => Some(Rect::new(0.0, 2000.0, 300.0, 200.0)),
            _ => None,
        };
        let events = engine.on_visibility_pass(Rect::new(0.0, 0.0, 1280.0, 720.0), bounds);
        assert_eq!(events, vec![VisibilityEvent::Revealed("hero".into())]);
        assert!(engine.state().is_revealed("hero"));
        assert!(!engine.state().is_revealed("card"));
    }

    #[test]
    fn test_unregistering_unlatched_element_clears_reveal() {
        let (engine, _clock) = engine();
        engine.register_element("badge", VisibilityOptions::default().with_latch(false));
        engine.on_visibility_pass(Rect::new(0.0, 0.0, 100.0, 100.0), |_| {
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        });
        assert!(engine.state().is_revealed("badge"));
        assert!(engine.state().is_revealed("hero"));

        assert!(engine.unregister_element("badge"));
        assert!(engine.unregister_element("hero"));
        assert!(!engine.unregister_element("badge"));
        assert!(!engine.state().is_revealed("badge"));
        assert!(engine.state().is_revealed("hero"));
    }

    #[test]
    fn test_handle_event_routes_input() {
        let (engine, _clock) = engine();
        assert!(engine.handle_event(&Event::scroll(900.0)));
        assert!(engine.handle_event(&Event::new(event_types::MENU_TOGGLE, EventData::None)));
        assert!(engine.state().menu_open);
        assert!(engine.handle_event(&Event::key_down(KeyCode::Escape)));
        assert!(!engine.state().menu_open);
        assert!(engine.handle_event(&Event::new(event_types::THEME_TOGGLE, EventData::None)));
        assert_eq!(engine.state().theme, ThemeMode::Light);
        assert!(engine.handle_event(&Event::nav_link("contact")));
        assert_eq!(engine.state().active_section_id.as_deref(), Some("contact"));

        assert!(engine.handle_event(&Event::new(event_types::UNMOUNT, EventData::None)));
        assert!(engine.is_torn_down());
        assert!(!engine.handle_event(&Event::scroll(0.0)));
    }

    #[test]
    fn test_nothing_fires_after_teardown() {
        let (engine, clock) = engine();
        let notifications = Arc::new(Mutex::new(0));
        let counter = notifications.clone();
        let sub = engine.subscribe(move |_| *counter.lock() += 1);
        sub.detach();

        engine.on_scroll(0.0);
        engine.on_scroll(1700.0);
        assert_eq!(engine.scheduler().pending(), 1);
        let before = *notifications.lock();

        engine.teardown();
        engine.teardown();
        assert_eq!(engine.scheduler().pending(), 0);

        advance(&engine, &clock, 1000);
        engine.on_scroll(2600.0);
        engine.toggle_theme();
        engine.on_resize(1200.0, 800.0, sections());
        assert_eq!(engine.tick(), 0);
        assert_eq!(*notifications.lock(), before);
        assert_eq!(engine.state().active_section_id.as_deref(), Some("home"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.reveal.threshold = 2.0;
        let result = ScrollEngine::new(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::new()),
        );
        assert!(result.is_err());
    }
}
