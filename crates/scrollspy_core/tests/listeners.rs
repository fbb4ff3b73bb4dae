//! Listener sets shared across threads and driven by a state machine

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use scrollspy_core::{ListenerSet, StateMachine};
use std::sync::Arc;

const CLOSED: u32 = 0;
const OPEN: u32 = 1;
const TOGGLE: u32 = 1;

#[test]
fn test_emit_from_many_threads() {
    let set: ListenerSet<u32> = ListenerSet::new();
    let total = Arc::new(Mutex::new(0u32));
    let sink = total.clone();
    let _subscription = set.subscribe(move |value| *sink.lock() += *value);

    let handles: Vec<_> = (1..=8u32)
        .map(|value| {
            let set = set.clone();
            std::thread::spawn(move || set.emit(&value))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }

    assert_eq!(*total.lock(), 36);
}

#[test]
fn test_state_machine_steps_feed_listeners() {
    let set: ListenerSet<bool> = ListenerSet::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = set.subscribe(move |open| sink.lock().push(*open));

    let mut menu = StateMachine::builder(CLOSED)
        .on(CLOSED, TOGGLE, OPEN)
        .on(OPEN, TOGGLE, CLOSED)
        .build();

    for _ in 0..3 {
        if let Some(step) = menu.send(TOGGLE) {
            set.emit(&(step.to == OPEN));
        }
    }

    assert_eq!(*seen.lock(), vec![true, false, true]);
    assert!(menu.is_in(OPEN));
}

#[test]
fn test_listener_added_during_emit_runs_next_time() {
    let set: ListenerSet<()> = ListenerSet::new();
    let calls = Arc::new(Mutex::new(0));

    let inner_set = set.clone();
    let inner_calls = calls.clone();
    set.add(move |_| {
        let calls = inner_calls.clone();
        if inner_set.len() == 1 {
            inner_set.add(move |_| *calls.lock() += 1);
        }
    });

    set.emit(&());
    assert_eq!(*calls.lock(), 0);
    set.emit(&());
    assert_eq!(*calls.lock(), 1);
}
