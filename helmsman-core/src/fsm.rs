//! Generic table-driven finite state machine.
//!
//! A machine is a map from state ids to [`State`]s; each state couples a
//! [`StateHandler`] with a transition table mapping the labels the handler
//! may return to target state ids. The engine itself knows nothing about
//! navigation: state ids, labels and events are type parameters.
//!
//! Event delivery is strictly non-re-entrant. Handlers decide, the engine
//! moves; a handler must never feed an event back into the machine.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Per-state behavior.
///
/// `handle_event` returns the label of a requested transition, or `None` to
/// stay. A returned label that the state's transition table does not list is
/// ignored without entering or exiting anything.
pub trait StateHandler<E, L>: Send {
    fn on_enter(&mut self);
    fn on_exit(&mut self);
    fn handle_event(&mut self, event: &E) -> Option<L>;
}

/// A handler plus the transitions reachable from it.
pub struct State<S, E, L> {
    handler: Box<dyn StateHandler<E, L>>,
    transitions: HashMap<L, S>,
}

impl<S, E, L> State<S, E, L> {
    pub fn new(handler: Box<dyn StateHandler<E, L>>, transitions: HashMap<L, S>) -> Self {
        Self {
            handler,
            transitions,
        }
    }
}

pub struct Fsm<S, E, L> {
    states: HashMap<S, State<S, E, L>>,
    current: S,
}

impl<S, E, L> Fsm<S, E, L>
where
    S: Copy + Eq + Hash + Debug + Display,
    L: Eq + Hash + Display,
{
    /// Build the machine and enter the initial state.
    ///
    /// The transition table is validated here: the initial state and every
    /// transition target must be registered. The initial state's `on_enter`
    /// runs exactly once, before any event is delivered.
    ///
    /// # Panics
    ///
    /// Panics on a table that names an unregistered state; the tables are
    /// static and a hole in one is a construction-time bug.
    pub fn new(mut states: HashMap<S, State<S, E, L>>, initial: S) -> Self {
        assert!(
            states.contains_key(&initial),
            "initial state {initial:?} is not registered"
        );
        for (id, state) in &states {
            for target in state.transitions.values() {
                assert!(
                    states.contains_key(target),
                    "state {id:?} has a transition to unregistered state {target:?}"
                );
            }
        }

        if let Some(state) = states.get_mut(&initial) {
            state.handler.on_enter();
        }

        Self {
            states,
            current: initial,
        }
    }

    /// Deliver one event to the current state's handler and apply the
    /// transition it requests, if any.
    pub fn handle_event(&mut self, event: &E) {
        let Some(state) = self.states.get_mut(&self.current) else {
            return;
        };

        let Some(label) = state.handler.handle_event(event) else {
            return;
        };
        let Some(&target) = state.transitions.get(&label) else {
            // the handler asked for a transition this state does not have
            return;
        };

        log::debug!("{} --[{}]--> {}", self.current, label, target);

        state.handler.on_exit();
        self.current = target;
        if let Some(next) = self.states.get_mut(&self.current) {
            next.handler.on_enter();
        }
    }

    pub fn current_state(&self) -> S {
        self.current
    }
}
