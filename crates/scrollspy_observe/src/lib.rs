//! scrollspy Observers
//!
//! Derives booleans and ids from raw layout and scroll coordinates:
//!
//! - [`VisibilityTracker`]: which registered elements have entered the
//!   (margin-adjusted) viewport, with one-shot latch or continuous semantics
//! - [`SectionResolver`]: which single content section is active for a
//!   scroll position
//!
//! Neither observer rate-limits itself; callers drive them through the
//! scheduler's throttle/debounce wrappers.

pub mod geometry;
pub mod sections;
pub mod visibility;

pub use geometry::{MarginParseError, Rect, RootMargin};
pub use sections::{ActiveChange, Section, SectionResolver};
pub use visibility::{VisibilityEvent, VisibilityOptions, VisibilityTracker};
