//! scrollspy Event Scheduling
//!
//! Rate limiting for high-frequency host events (scroll, resize).
//!
//! # Features
//!
//! - **Clocks**: Monotonic system clock and a manual clock for deterministic
//!   tests and scenario replay
//! - **Timers**: Cancellable one-shot timers run cooperatively by the host
//! - **Debounce**: Trailing-edge, last-arguments-win
//! - **Throttle**: Leading-edge, trailing calls dropped
//!
//! # Example
//!
//! ```rust
//! use scrollspy_scheduler::{ManualClock, Scheduler};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let scheduler = Scheduler::new(Arc::new(clock.clone()));
//!
//! let last = Arc::new(AtomicU32::new(0));
//! let last_clone = last.clone();
//! let debounced = scheduler.debounce(Duration::from_millis(100), move |y: u32| {
//!     last_clone.store(y, Ordering::SeqCst);
//! });
//!
//! debounced.call(10);
//! debounced.call(20);
//! clock.advance(Duration::from_millis(100));
//! scheduler.run_due();
//!
//! assert_eq!(last.load(Ordering::SeqCst), 20);
//! ```

pub mod clock;
pub mod debounce;
pub mod error;
pub mod scheduler;
pub mod throttle;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use debounce::Debouncer;
pub use error::{Result, SchedulerError};
pub use scheduler::{Scheduler, TimerId};
pub use throttle::Throttler;
