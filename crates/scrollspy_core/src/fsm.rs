//! Flat state machines for interaction state.
//!
//! A machine is a transition table keyed by `(state, event)`. Events with no
//! entry for the current state are ignored and leave no history.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

pub type StateId = u32;
pub type EventId = u32;

/// Steps retained by [`StateMachine::history`]
pub const HISTORY_LIMIT: usize = 64;

/// A recorded transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

pub struct StateMachineBuilder {
    initial: StateId,
    edges: FxHashMap<(StateId, EventId), StateId>,
}

impl StateMachineBuilder {
    /// Move from `from` to `to` on `event`. A later edge for the same
    /// `(from, event)` pair replaces the earlier one.
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.edges.insert((from, event), to);
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            state: self.initial,
            edges: self.edges,
            history: VecDeque::new(),
        }
    }
}

#[derive(Debug)]
pub struct StateMachine {
    state: StateId,
    edges: FxHashMap<(StateId, EventId), StateId>,
    history: VecDeque<Step>,
}

impl StateMachine {
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            edges: FxHashMap::default(),
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.state == state
    }

    /// Oldest first
    pub fn history(&self) -> impl ExactSizeIterator<Item = &Step> {
        self.history.iter()
    }

    /// Whether `event` has an edge out of the current state
    pub fn accepts(&self, event: EventId) -> bool {
        self.edges.contains_key(&(self.state, event))
    }

    /// Deliver `event`. Returns the step taken, or `None` when no edge fired.
    pub fn send(&mut self, event: EventId) -> Option<Step> {
        let from = self.state;
        let to = *self.edges.get(&(from, event))?;

        self.state = to;
        let step = Step { from, event, to };
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(step);

        tracing::trace!(from, event, to, "state machine step");
        Some(step)
    }
}
