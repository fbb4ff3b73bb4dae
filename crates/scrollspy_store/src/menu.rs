//! Mobile navigation menu state machine

use scrollspy_core::fsm::{EventId, StateId, StateMachine};
use serde::{Deserialize, Serialize};

/// Menu states
pub mod states {
    use scrollspy_core::fsm::StateId;

    pub const CLOSED: StateId = 0;
    pub const OPEN: StateId = 1;
}

/// What asked the menu to change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum MenuTrigger {
    /// Hamburger button; the only trigger that opens the menu
    Toggle = 1,
    /// A navigation link was followed
    NavLink = 2,
    Escape = 3,
    /// Pointer pressed outside the menu
    OutsideClick = 4,
    /// Viewport widened past the mobile breakpoint
    BreakpointExceeded = 5,
}

impl MenuTrigger {
    pub const ALL: [MenuTrigger; 5] = [
        MenuTrigger::Toggle,
        MenuTrigger::NavLink,
        MenuTrigger::Escape,
        MenuTrigger::OutsideClick,
        MenuTrigger::BreakpointExceeded,
    ];

    pub fn event_id(self) -> EventId {
        self as EventId
    }

    pub fn from_event_id(event: EventId) -> Option<Self> {
        Self::ALL.into_iter().find(|trigger| trigger.event_id() == event)
    }
}

/// `Closed <-> Open` with every trigger closing and only `Toggle` opening
pub struct MenuMachine {
    fsm: StateMachine,
}

impl MenuMachine {
    pub fn new() -> Self {
        let mut builder = StateMachine::builder(states::CLOSED)
            .on(states::CLOSED, MenuTrigger::Toggle.event_id(), states::OPEN);
        for trigger in MenuTrigger::ALL {
            builder = builder.on(states::OPEN, trigger.event_id(), states::CLOSED);
        }
        Self {
            fsm: builder.build(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.fsm.is_in(states::OPEN)
    }

    pub fn state(&self) -> StateId {
        self.fsm.state()
    }

    /// Whether `trigger` would change the state
    pub fn accepts(&self, trigger: MenuTrigger) -> bool {
        self.fsm.accepts(trigger.event_id())
    }

    /// Apply `trigger`; returns `true` if the state changed
    pub fn fire(&mut self, trigger: MenuTrigger) -> bool {
        let Some(step) = self.fsm.send(trigger.event_id()) else {
            return false;
        };
        tracing::debug!(?trigger, open = step.to == states::OPEN, "menu transition");
        true
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> Vec<(bool, MenuTrigger, bool)> {
        self.fsm
            .history()
            .filter_map(|step| {
                let trigger = MenuTrigger::from_event_id(step.event)?;
                Some((step.from == states::OPEN, trigger, step.to == states::OPEN))
            })
            .collect()
    }
}

impl Default for MenuMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MenuMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuMachine")
            .field("open", &self.is_open())
            .finish()
    }
}
