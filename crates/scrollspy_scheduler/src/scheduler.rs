//! Cooperative timer queue
//!
//! The host drives the queue by calling [`Scheduler::run_due`] from its event
//! loop (once per frame or when [`Scheduler::next_deadline`] passes). Timer
//! callbacks run on the caller's thread with no scheduler lock held.

use crate::clock::{Clock, Timestamp};
use crate::debounce::Debouncer;
use crate::error::{Result, SchedulerError};
use crate::throttle::Throttler;
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;
use std::time::Duration;

new_key_type! {
    /// Handle for a scheduled timer
    pub struct TimerId;
}

type TimerCallback = Box<dyn FnOnce() + Send>;

struct Timer {
    deadline: Timestamp,
    /// Insertion sequence; orders timers sharing a deadline
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct TimerQueue {
    timers: SlotMap<TimerId, Timer>,
    next_seq: u64,
    shut_down: bool,
}

/// Shared handle to a timer queue and its clock.
///
/// Clones refer to the same queue.
#[derive(Clone)]
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    queue: Arc<Mutex<TimerQueue>>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(TimerQueue::default())),
        }
    }

    /// The clock timers are measured against
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Schedule `callback` to run once `delay` has elapsed
    pub fn schedule_after<F>(&self, delay: Duration, callback: F) -> Result<TimerId>
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = self.clock.now().saturating_add(delay);
        let mut queue = self.queue.lock();
        if queue.shut_down {
            return Err(SchedulerError::ShutDown);
        }

        let seq = queue.next_seq;
        queue.next_seq += 1;
        let id = queue.timers.insert(Timer {
            deadline,
            seq,
            callback: Box::new(callback),
        });
        tracing::trace!(?id, deadline = deadline.as_millis(), "timer scheduled");
        Ok(id)
    }

    /// Cancel a pending timer. Returns false if it already ran or was
    /// cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        self.queue.lock().timers.remove(id).is_some()
    }

    /// Run every timer whose deadline has passed.
    ///
    /// Timers run in deadline order, ties broken by scheduling order. Timers
    /// scheduled by a callback during this pass wait for the next pass even
    /// if already due. A panicking callback propagates to the caller; the
    /// timers after it stay queued.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let horizon = self.queue.lock().next_seq;
        let mut ran = 0;

        loop {
            let timer = {
                let mut queue = self.queue.lock();
                if queue.shut_down {
                    break;
                }
                let next = queue
                    .timers
                    .iter()
                    .filter(|(_, t)| t.deadline <= now && t.seq < horizon)
                    .min_by_key(|(_, t)| (t.deadline, t.seq))
                    .map(|(id, _)| id);
                next.and_then(|id| queue.timers.remove(id))
            };

            let Some(timer) = timer else {
                break;
            };
            (timer.callback)();
            ran += 1;
        }

        if ran > 0 {
            tracing::trace!(ran, now = now.as_millis(), "timers fired");
        }
        ran
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.lock().timers.values().map(|t| t.deadline).min()
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.queue.lock().timers.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue.lock().shut_down
    }

    /// Drop every pending timer and refuse new ones
    pub fn shutdown(&self) {
        let dropped = {
            let mut queue = self.queue.lock();
            queue.shut_down = true;
            std::mem::take(&mut queue.timers)
        };
        tracing::debug!(dropped = dropped.len(), "scheduler shut down");
        // Callbacks are dropped outside the lock; their captures may hold
        // handles that lock the queue on drop.
        drop(dropped);
    }

    /// Wrap `f` so it runs `wait` after the most recent call
    pub fn debounce<A, F>(&self, wait: Duration, f: F) -> Debouncer<A>
    where
        A: Send + 'static,
        F: FnMut(A) + Send + 'static,
    {
        Debouncer::new(self.clone(), wait, f)
    }

    /// Wrap `f` so it runs at most once per `limit`, on the leading edge
    pub fn throttle<A, R, F>(&self, limit: Duration, f: F) -> Throttler<A, R>
    where
        F: FnMut(A) -> R + Send + 'static,
    {
        Throttler::new(self.clock.clone(), limit, f)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.queue.lock();
        f.debug_struct("Scheduler")
            .field("now", &self.clock.now())
            .field("pending", &queue.timers.len())
            .field("shut_down", &queue.shut_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use parking_lot::Mutex;

    fn setup() -> (ManualClock, Scheduler) {
        let clock = ManualClock::new();
        let scheduler = Scheduler::new(Arc::new(clock.clone()));
        (clock, scheduler)
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let (clock, scheduler) = setup();
        let log = Arc::new(Mutex::new(Vec::new()));

        for (name, delay) in [("late", 30), ("early", 10), ("tie-a", 20), ("tie-b", 20)] {
            let log = log.clone();
            scheduler
                .schedule_after(Duration::from_millis(delay), move || log.lock().push(name))
                .unwrap();
        }

        clock.advance(Duration::from_millis(20));
        assert_eq!(scheduler.run_due(), 3);
        assert_eq!(*log.lock(), vec!["early", "tie-a", "tie-b"]);

        clock.advance(Duration::from_millis(10));
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel() {
        let (clock, scheduler) = setup();
        let fired = Arc::new(Mutex::new(false));
        let fired_clone = fired.clone();

        let id = scheduler
            .schedule_after(Duration::from_millis(5), move || *fired_clone.lock() = true)
            .unwrap();
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        clock.advance(Duration::from_millis(10));
        assert_eq!(scheduler.run_due(), 0);
        assert!(!*fired.lock());
    }

    #[test]
    fn test_rescheduling_from_callback_waits_for_next_pass() {
        let (_clock, scheduler) = setup();
        let count = Arc::new(Mutex::new(0));

        let inner_scheduler = scheduler.clone();
        let count_clone = count.clone();
        scheduler
            .schedule_after(Duration::ZERO, move || {
                *count_clone.lock() += 1;
                let count = count_clone.clone();
                inner_scheduler
                    .schedule_after(Duration::ZERO, move || *count.lock() += 1)
                    .unwrap();
            })
            .unwrap();

        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(*count.lock(), 1);
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_shutdown_drops_and_rejects() {
        let (clock, scheduler) = setup();
        let fired = Arc::new(Mutex::new(false));
        let fired_clone = fired.clone();

        scheduler
            .schedule_after(Duration::from_millis(1), move || *fired_clone.lock() = true)
            .unwrap();
        scheduler.shutdown();

        assert!(scheduler.is_shut_down());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(
            scheduler.schedule_after(Duration::ZERO, || {}),
            Err(SchedulerError::ShutDown)
        );

        clock.advance(Duration::from_millis(5));
        assert_eq!(scheduler.run_due(), 0);
        assert!(!*fired.lock());
    }

    #[test]
    fn test_next_deadline() {
        let (_clock, scheduler) = setup();
        assert_eq!(scheduler.next_deadline(), None);
        scheduler
            .schedule_after(Duration::from_millis(40), || {})
            .unwrap();
        scheduler
            .schedule_after(Duration::from_millis(15), || {})
            .unwrap();
        assert_eq!(scheduler.next_deadline(), Some(Timestamp::from_millis(15)));
    }
}
