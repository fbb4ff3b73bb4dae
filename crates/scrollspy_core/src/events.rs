//! Host input events
//!
//! The view layer translates platform events into these before handing them
//! to the engine.

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const KEY_DOWN: EventType = 20;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;

    /// Navigation link activated (click or keyboard)
    pub const NAV_LINK: EventType = 50;
    /// Theme toggle button pressed
    pub const THEME_TOGGLE: EventType = 51;
    /// Menu (hamburger) button pressed
    pub const MENU_TOGGLE: EventType = 52;

    // Lifecycle
    pub const UNMOUNT: EventType = 61;
}

/// A host event with associated data
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
    /// Host timestamp in milliseconds (informational only)
    pub timestamp: u64,
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Scroll {
        /// Vertical document scroll position in px
        scroll_y: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Key {
        key: KeyCode,
    },
    Pointer {
        x: f64,
        y: f64,
        /// Whether the press landed inside the navigation menu region
        inside_menu: bool,
    },
    NavLink {
        section_id: String,
    },
    None,
}

impl Event {
    pub fn new(event_type: EventType, data: EventData) -> Self {
        Self {
            event_type,
            data,
            timestamp: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn scroll(scroll_y: f64) -> Self {
        Self::new(event_types::SCROLL, EventData::Scroll { scroll_y })
    }

    pub fn resize(width: f64, height: f64) -> Self {
        Self::new(event_types::RESIZE, EventData::Resize { width, height })
    }

    pub fn key_down(key: KeyCode) -> Self {
        Self::new(event_types::KEY_DOWN, EventData::Key { key })
    }

    pub fn pointer_down(x: f64, y: f64, inside_menu: bool) -> Self {
        Self::new(
            event_types::POINTER_DOWN,
            EventData::Pointer { x, y, inside_menu },
        )
    }

    pub fn nav_link(section_id: impl Into<String>) -> Self {
        Self::new(
            event_types::NAV_LINK,
            EventData::NavLink {
                section_id: section_id.into(),
            },
        )
    }
}

/// Keys the engine distinguishes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum KeyCode {
    Escape,
    Tab,
    Enter,
    Space,
    #[default]
    Unidentified,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> KeyCode {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            _ => Self::Unidentified,
        }
    }
}
