//! Trailing-edge debounce

use crate::scheduler::{Scheduler, TimerId};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

struct Slot<A> {
    pending: Option<A>,
    timer: Option<TimerId>,
    /// Bumped on every call/cancel so a timer that already left the queue
    /// cannot fire stale arguments.
    generation: u64,
}

struct Inner<A> {
    slot: Mutex<Slot<A>>,
    f: Mutex<Box<dyn FnMut(A) + Send>>,
}

impl<A> Inner<A> {
    fn fire(&self, generation: u64) {
        let args = {
            let mut slot = self.slot.lock();
            if slot.generation != generation {
                return;
            }
            slot.timer = None;
            slot.pending.take()
        };

        if let Some(args) = args {
            (self.f.lock())(args);
        }
    }
}

/// Delays a function until `wait` has passed without another call.
///
/// Each [`call`](Debouncer::call) replaces the pending arguments and restarts
/// the timer. Dropping the debouncer cancels whatever is pending.
pub struct Debouncer<A: Send + 'static> {
    inner: Arc<Inner<A>>,
    scheduler: Scheduler,
    wait: Duration,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(scheduler: Scheduler, wait: Duration, f: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    pending: None,
                    timer: None,
                    generation: 0,
                }),
                f: Mutex::new(Box::new(f)),
            }),
            scheduler,
            wait,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call; `f` runs with these arguments unless another call
    /// arrives within `wait`.
    ///
    /// Returns false if the scheduler is shut down and the call was dropped.
    pub fn call(&self, args: A) -> bool {
        let mut slot = self.inner.slot.lock();
        if let Some(timer) = slot.timer.take() {
            self.scheduler.cancel(timer);
        }
        slot.generation += 1;
        let generation = slot.generation;

        let weak: Weak<Inner<A>> = Arc::downgrade(&self.inner);
        let scheduled = self.scheduler.schedule_after(self.wait, move || {
            if let Some(inner) = weak.upgrade() {
                inner.fire(generation);
            }
        });

        match scheduled {
            Ok(timer) => {
                slot.pending = Some(args);
                slot.timer = Some(timer);
                true
            }
            Err(err) => {
                slot.pending = None;
                tracing::debug!(%err, "debounced call dropped");
                false
            }
        }
    }

    /// Whether a call is waiting for its timer
    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    /// Drop the pending call, if any. Returns true if one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            self.scheduler.cancel(timer);
        }
        slot.pending.take().is_some()
    }

    /// Run the pending call now instead of waiting. Returns true if one ran.
    pub fn flush(&self) -> bool {
        let args = {
            let mut slot = self.inner.slot.lock();
            slot.generation += 1;
            if let Some(timer) = slot.timer.take() {
                self.scheduler.cancel(timer);
            }
            slot.pending.take()
        };

        match args {
            Some(args) => {
                (self.inner.f.lock())(args);
                true
            }
            None => false,
        }
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<A: Send + 'static> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .finish()
    }
}
