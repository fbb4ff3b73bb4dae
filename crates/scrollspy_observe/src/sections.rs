//! Active-section resolution
//!
//! Maps a scroll position onto the single content section that should be
//! highlighted in the navigation. Sections cover half-open ranges
//! `[top_offset, top_offset + height)`; when ranges overlap the section
//! starting furthest down the page wins.

use indexmap::IndexMap;
use scrollspy_core::listeners::{ListenerSet, Subscription};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A content section in document coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub top_offset: f64,
    pub height: f64,
}

impl Section {
    pub fn new(id: impl Into<String>, top_offset: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top_offset,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top_offset + self.height
    }

    /// Whether `position` falls inside this section's range.
    ///
    /// Degenerate sections (non-positive height, non-finite geometry)
    /// contain nothing.
    pub fn contains(&self, position: f64) -> bool {
        self.top_offset.is_finite()
            && self.height.is_finite()
            && self.height > 0.0
            && position >= self.top_offset
            && position < self.bottom()
    }
}

/// Emitted when the active section id changes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChange {
    pub previous: Option<String>,
    pub current: Option<String>,
}

/// Resolves scroll positions to the active section
pub struct SectionResolver {
    sections: Arc<[Section]>,
    last_emitted: Option<String>,
    last_position: Option<f64>,
    listeners: ListenerSet<ActiveChange>,
}

impl Default for SectionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionResolver {
    pub fn new() -> Self {
        Self {
            sections: Arc::from(Vec::new()),
            last_emitted: None,
            last_position: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Replace the registered sections.
    ///
    /// The new set is built in full before it is swapped in. Duplicate ids
    /// keep the last definition at the position of the first.
    pub fn register_sections(&mut self, sections: impl IntoIterator<Item = Section>) {
        let mut by_id: IndexMap<String, Section> = IndexMap::new();
        for section in sections {
            if !section.contains(section.top_offset) {
                tracing::debug!(id = %section.id, height = section.height, "degenerate section registered");
            }
            by_id.insert(section.id.clone(), section);
        }

        let sections: Arc<[Section]> = by_id.into_values().collect();
        tracing::debug!(count = sections.len(), "sections registered");
        self.sections = sections;
    }

    /// Current section set. The returned handle is unaffected by later
    /// registrations.
    pub fn sections(&self) -> Arc<[Section]> {
        Arc::clone(&self.sections)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Section containing `position`.
    ///
    /// When several ranges contain it, the greatest `top_offset` wins and
    /// ties go to the section registered last.
    pub fn resolve(&self, position: f64) -> Option<&Section> {
        if !position.is_finite() {
            return None;
        }
        self.sections
            .iter()
            .filter(|section| section.contains(position))
            .max_by(|a, b| a.top_offset.total_cmp(&b.top_offset))
    }

    /// Resolve `scroll_y + viewport_offset` and emit a change if the active
    /// id differs from the last one emitted.
    pub fn on_scroll(&mut self, scroll_y: f64, viewport_offset: f64) -> Option<ActiveChange> {
        let position = scroll_y + viewport_offset;
        self.last_position = Some(position);
        let current = self.resolve(position).map(|section| section.id.clone());
        tracing::trace!(scroll_y, position, active = ?current, "resolved scroll position");
        self.apply(current)
    }

    /// Re-resolve at the last effective position, e.g. after the sections
    /// were recomputed. Does nothing before the first scroll.
    pub fn refresh(&mut self) -> Option<ActiveChange> {
        let position = self.last_position?;
        let current = self.resolve(position).map(|section| section.id.clone());
        self.apply(current)
    }

    /// Record an activation made outside of scrolling (a nav link click).
    ///
    /// Unknown ids are ignored and return `false`. No change is emitted;
    /// the caller is expected to publish the new id itself.
    pub fn sync_active(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if self.section(id).is_none() {
                tracing::debug!(%id, "sync to unknown section ignored");
                return false;
            }
        }
        self.last_emitted = id.map(str::to_string);
        true
    }

    /// Last emitted active id
    pub fn active(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    /// Scroll offset that brings `id` just below a fixed header
    pub fn scroll_target(&self, id: &str, header_height: f64) -> Option<f64> {
        self.section(id)
            .map(|section| (section.top_offset - header_height).max(0.0))
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ActiveChange) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Forget sections, the active id and subscribers
    pub fn clear(&mut self) {
        self.sections = Arc::from(Vec::new());
        self.last_emitted = None;
        self.last_position = None;
        self.listeners.clear();
    }

    fn apply(&mut self, current: Option<String>) -> Option<ActiveChange> {
        if current == self.last_emitted {
            return None;
        }
        let change = ActiveChange {
            previous: std::mem::replace(&mut self.last_emitted, current.clone()),
            current,
        };
        tracing::debug!(previous = ?change.previous, current = ?change.current, "active section changed");
        self.listeners.emit(&change);
        Some(change)
    }
}

impl std::fmt::Debug for SectionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionResolver")
            .field("sections", &self.sections.len())
            .field("active", &self.last_emitted)
            .field("last_position", &self.last_position)
            .finish()
    }
}
