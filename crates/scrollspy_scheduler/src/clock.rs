//! Time sources for the scheduler.
//!
//! Timers, debounce and throttle all read time through [`Clock`] so they can
//! run against the wall clock in a host and against a [`ManualClock`] in tests
//! and headless replays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Milliseconds since the clock's origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Add a duration, saturating at `u64::MAX` milliseconds
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// A monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock measured from the moment it was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(millis)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same position, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    position: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position
    pub fn position(&self) -> Timestamp {
        Timestamp::from_millis(self.position.load(Ordering::SeqCst))
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) -> Timestamp {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let previous = self
            .position
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| {
                Some(p.saturating_add(millis))
            })
            .unwrap_or_else(|p| p);
        Timestamp::from_millis(previous.saturating_add(millis))
    }

    /// Seek to `to`. The clock never moves backwards; earlier positions are
    /// ignored.
    pub fn set(&self, to: Timestamp) -> Timestamp {
        let previous = self.position.fetch_max(to.as_millis(), Ordering::SeqCst);
        Timestamp::from_millis(previous.max(to.as_millis()))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.position()
    }
}
