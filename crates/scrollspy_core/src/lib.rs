//! scrollspy Core
//!
//! Foundational primitives shared by every scrollspy crate:
//!
//! - **Events**: Host input (scroll, resize, keys, pointer presses, nav links)
//! - **State Machines**: Flat statecharts used for the navigation menu
//! - **Listener Sets**: Subscription lists with disposer handles and
//!   per-listener panic isolation
//!
//! # Example
//!
//! ```rust
//! use scrollspy_core::listeners::ListenerSet;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let set: ListenerSet<u32> = ListenerSet::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let seen_clone = seen.clone();
//!
//! let subscription = set.subscribe(move |value| {
//!     seen_clone.fetch_add(*value as usize, Ordering::SeqCst);
//! });
//!
//! set.emit(&3);
//! subscription.unsubscribe();
//! set.emit(&3);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 3);
//! ```

pub mod events;
pub mod fsm;
pub mod listeners;

pub use events::{Event, EventData, EventType, KeyCode};
pub use fsm::{EventId, StateId, StateMachine, Step};
pub use listeners::{ListenerId, ListenerSet, Subscription};
