//! Leading-edge throttle

use crate::clock::{Clock, Timestamp};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Window {
    started: Option<Timestamp>,
    closed: bool,
}

/// Runs a function at most once per `limit`.
///
/// The first call fires immediately and opens a window; calls inside the
/// window are dropped, not queued. The first call at or after the end of the
/// window fires and opens the next one. No timers are involved, so there is
/// nothing to leak; [`close`](Throttler::close) makes every later call a
/// no-op.
pub struct Throttler<A, R> {
    clock: Arc<dyn Clock>,
    limit: Duration,
    window: Mutex<Window>,
    f: Mutex<Box<dyn FnMut(A) -> R + Send>>,
}

impl<A, R> Throttler<A, R> {
    pub fn new<F>(clock: Arc<dyn Clock>, limit: Duration, f: F) -> Self
    where
        F: FnMut(A) -> R + Send + 'static,
    {
        Self {
            clock,
            limit,
            window: Mutex::new(Window::default()),
            f: Mutex::new(Box::new(f)),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Invoke `f` if the current window has elapsed.
    ///
    /// Returns `Some` with `f`'s result when it ran and `None` when the call
    /// was dropped.
    pub fn call(&self, args: A) -> Option<R> {
        let now = self.clock.now();
        {
            let mut window = self.window.lock();
            if window.closed {
                return None;
            }
            if let Some(started) = window.started {
                if now < started.saturating_add(self.limit) {
                    return None;
                }
            }
            window.started = Some(now);
        }

        Some((self.f.lock())(args))
    }

    /// Forget the current window so the next call fires immediately
    pub fn reset(&self) {
        self.window.lock().started = None;
    }

    /// Permanently disable the throttle
    pub fn close(&self) {
        self.window.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.window.lock().closed
    }
}

impl<A, R> std::fmt::Debug for Throttler<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let window = self.window.lock();
        f.debug_struct("Throttler")
            .field("limit", &self.limit)
            .field("window_started", &window.started)
            .field("closed", &window.closed)
            .finish()
    }
}
