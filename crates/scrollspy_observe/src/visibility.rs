//! Viewport intersection tracking
//!
//! The host's intersection primitive (or a test) supplies the viewport and
//! element bounds for each pass; the tracker decides which elements flip to
//! revealed or back to hidden.

use crate::geometry::{Rect, RootMargin};
use indexmap::IndexMap;
use scrollspy_core::listeners::{ListenerSet, Subscription};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-element observation options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityOptions {
    /// Minimum fraction of the element that must be inside the viewport
    pub threshold: f64,
    /// Adjustment applied to the viewport before testing
    pub root_margin: RootMargin,
    /// Once revealed, stay revealed
    pub latch: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
            latch: true,
        }
    }
}

impl VisibilityOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_latch(mut self, latch: bool) -> Self {
        self.latch = latch;
        self
    }
}

/// A registered element and its current reveal state
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedElement {
    pub id: String,
    pub revealed: bool,
    pub options: VisibilityOptions,
}

impl TrackedElement {
    pub fn latch(&self) -> bool {
        self.options.latch
    }
}

/// Reveal state change produced by an observation pass
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum VisibilityEvent {
    Revealed(String),
    Hidden(String),
}

impl VisibilityEvent {
    pub fn id(&self) -> &str {
        match self {
            VisibilityEvent::Revealed(id) | VisibilityEvent::Hidden(id) => id,
        }
    }
}

/// Fraction of `target` inside `root`, or `None` when they do not touch.
/// Zero-area targets that touch the root count as fully visible.
pub fn intersection_ratio(root: &Rect, target: &Rect) -> Option<f64> {
    if !root.is_finite() || !target.is_finite() {
        return None;
    }
    let overlap = root.intersection(target)?;
    let area = target.area();
    if area == 0.0 {
        return Some(1.0);
    }
    Some((overlap.area() / area).clamp(0.0, 1.0))
}

/// Tracks which registered elements have entered the viewport
#[derive(Default)]
pub struct VisibilityTracker {
    elements: IndexMap<String, TrackedElement>,
    listeners: ListenerSet<VisibilityEvent>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an element.
    ///
    /// Registering an id that is already tracked replaces its options and
    /// resets it to not revealed; the previous entry is returned.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        options: VisibilityOptions,
    ) -> Option<TrackedElement> {
        let id = id.into();
        let options = VisibilityOptions {
            threshold: if options.threshold.is_nan() {
                0.0
            } else {
                options.threshold.clamp(0.0, 1.0)
            },
            ..options
        };

        let previous = self.elements.insert(
            id.clone(),
            TrackedElement {
                id: id.clone(),
                revealed: false,
                options,
            },
        );
        if previous.is_some() {
            tracing::debug!(%id, "element re-registered; previous registration replaced");
        }
        previous
    }

    /// Stop tracking an element. Returns `false` for unknown ids.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.elements.shift_remove(id).is_some()
    }

    /// Subscribe to reveal/hide events
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&VisibilityEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Run one observation pass.
    ///
    /// `bounds` maps an element id to its bounding box in the same coordinate
    /// space as `viewport`; elements it does not know are skipped this pass.
    /// Events are returned in registration order and also sent to
    /// subscribers.
    pub fn observe<F>(&mut self, viewport: Rect, mut bounds: F) -> Vec<VisibilityEvent>
    where
        F: FnMut(&str) -> Option<Rect>,
    {
        let mut events: SmallVec<[VisibilityEvent; 8]> = SmallVec::new();

        for element in self.elements.values_mut() {
            if element.revealed && element.options.latch {
                continue;
            }
            let Some(target) = bounds(&element.id) else {
                tracing::trace!(id = %element.id, "no bounds for tracked element");
                continue;
            };

            let root = viewport.expand(&element.options.root_margin);
            let intersecting = intersection_ratio(&root, &target)
                .map_or(false, |ratio| ratio >= element.options.threshold);

            if intersecting && !element.revealed {
                element.revealed = true;
                events.push(VisibilityEvent::Revealed(element.id.clone()));
            } else if !intersecting && element.revealed && !element.options.latch {
                element.revealed = false;
                events.push(VisibilityEvent::Hidden(element.id.clone()));
            }
        }

        for event in &events {
            tracing::debug!(?event, "visibility changed");
            self.listeners.emit(event);
        }
        events.into_vec()
    }

    /// Reveal state of an element, `None` if it is not tracked
    pub fn is_revealed(&self, id: &str) -> Option<bool> {
        self.elements.get(id).map(|element| element.revealed)
    }

    pub fn get(&self, id: &str) -> Option<&TrackedElement> {
        self.elements.get(id)
    }

    /// Tracked ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Forget every element and subscriber
    pub fn clear(&mut self) {
        self.elements.clear();
        self.listeners.clear();
    }
}

impl std::fmt::Debug for VisibilityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("elements", &self.elements.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
