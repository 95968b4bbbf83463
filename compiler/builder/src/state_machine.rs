//! Finite automaton over builder phases.
//!
//! Every builder call names the state it wants to enter. The machine accepts
//! the call only if the current state lists that state as a successor in the
//! graph chosen for the collection shape.

use std::fmt;

use crate::{BuilderError, Result};

/// Builder phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing declared yet.
    Start,
    /// The file overview was set.
    Overview,
    /// The import text was set.
    ImportText,
    /// Declaring mapping keys.
    MapKeys,
    /// Declaring set elements.
    SetElements,
    /// The value type was set.
    ValueType,
    /// The pairing base was configured.
    Pairing,
    /// Locked; no further mutation.
    Locked,
    /// Terminal state after any failed operation.
    Errored,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Start => "start",
            State::Overview => "overview",
            State::ImportText => "importText",
            State::MapKeys => "mapKeys",
            State::SetElements => "setElements",
            State::ValueType => "valueType",
            State::Pairing => "pairing",
            State::Locked => "locked",
            State::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Transition graph a machine follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// Plain mapping: keys, optional value type, lock.
    Map,
    /// Plain set: elements, lock.
    Set,
    /// Mapping of sets: keys, then elements, then lock.
    MapOfSets,
    /// Paired collection: pairing, then lock.
    OneToOne,
}

impl GraphKind {
    /// Legal successors of `state` in this graph.
    pub fn successors(&self, state: State) -> &'static [State] {
        use State::*;
        match (self, state) {
            (GraphKind::Map, Start) => &[Overview, ImportText, MapKeys],
            (GraphKind::Map, Overview) => &[ImportText, MapKeys],
            (GraphKind::Map, ImportText) => &[MapKeys],
            (GraphKind::Map, MapKeys) => &[MapKeys, ValueType, Locked],
            (GraphKind::Map, ValueType) => &[Locked],

            (GraphKind::Set, Start) => &[Overview, ImportText, SetElements],
            (GraphKind::Set, Overview) => &[ImportText, SetElements],
            (GraphKind::Set, ImportText) => &[SetElements],
            (GraphKind::Set, SetElements) => &[SetElements, Locked],

            (GraphKind::MapOfSets, Start) => &[Overview, ImportText, MapKeys],
            (GraphKind::MapOfSets, Overview) => &[ImportText, MapKeys],
            (GraphKind::MapOfSets, ImportText) => &[MapKeys],
            (GraphKind::MapOfSets, MapKeys) => &[MapKeys, SetElements],
            (GraphKind::MapOfSets, SetElements) => &[SetElements, Locked],

            (GraphKind::OneToOne, Start) => &[Overview, ImportText, Pairing],
            (GraphKind::OneToOne, Overview) => &[ImportText, Pairing],
            (GraphKind::OneToOne, ImportText) => &[Pairing],
            (GraphKind::OneToOne, Pairing) => &[Locked],

            _ => &[],
        }
    }
}

/// State machine guarding one builder.
#[derive(Debug, Clone)]
pub struct ConfigurationStateMachine {
    graph: GraphKind,
    state: State,
}

impl ConfigurationStateMachine {
    /// Started machine for `graph`.
    pub fn new(graph: GraphKind) -> Self { Self { graph, state: State::Start } }

    /// Graph this machine follows.
    pub fn graph(&self) -> GraphKind { self.graph }

    /// Current state.
    pub fn current_state(&self) -> State { self.state }

    /// Whether a previous operation failed.
    pub fn is_errored(&self) -> bool { self.state == State::Errored }

    /// Advances to `next` if the graph allows it; returns whether it did.
    pub fn do_state_transition(&mut self, next: State) -> bool {
        if self.graph.successors(self.state).contains(&next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    /// Runs one state-mutating operation. Any error moves the machine to
    /// [`State::Errored`], after which every later operation fails.
    ///
    /// A locked machine stays locked: nothing can transition out of
    /// [`State::Locked`], so a rejected call there has mutated nothing.
    pub fn catch_error_state<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.is_errored() {
            return Err(BuilderError::Dead);
        }
        let was_locked = self.state == State::Locked;
        let result = op(self);
        if result.is_err() && !was_locked {
            self.state = State::Errored;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_graph() {
        let mut machine = ConfigurationStateMachine::new(GraphKind::Map);
        assert!(!machine.do_state_transition(State::Locked));
        assert!(machine.do_state_transition(State::Overview));
        assert!(!machine.do_state_transition(State::Overview));
        assert!(machine.do_state_transition(State::MapKeys));
        assert!(machine.do_state_transition(State::MapKeys));
        assert!(machine.do_state_transition(State::ValueType));
        assert!(!machine.do_state_transition(State::MapKeys));
        assert!(machine.do_state_transition(State::Locked));
        assert!(!machine.do_state_transition(State::Locked));
    }

    #[test]
    fn test_rejection_keeps_locked_state() {
        let mut machine = ConfigurationStateMachine::new(GraphKind::Set);
        assert!(machine.do_state_transition(State::SetElements));
        assert!(machine.do_state_transition(State::Locked));

        let rejected: Result<()> = machine.catch_error_state(|_| Err(BuilderError::Locked));
        assert_eq!(rejected, Err(BuilderError::Locked));
        assert_eq!(machine.current_state(), State::Locked);
        assert!(!machine.is_errored());

        let mut open = ConfigurationStateMachine::new(GraphKind::Set);
        let failed: Result<()> = open.catch_error_state(|_| Err(BuilderError::Locked));
        assert!(failed.is_err());
        assert!(open.is_errored());
    }

    #[test]
    fn test_map_of_sets_requires_keys_before_elements() {
        let mut machine = ConfigurationStateMachine::new(GraphKind::MapOfSets);
        assert!(!machine.do_state_transition(State::SetElements));
        assert!(machine.do_state_transition(State::MapKeys));
        assert!(!machine.do_state_transition(State::Locked));
        assert!(machine.do_state_transition(State::SetElements));
        assert!(!machine.do_state_transition(State::MapKeys));
        assert!(machine.do_state_transition(State::Locked));
    }

    #[test]
    fn test_one_to_one_skips_keys() {
        let mut machine = ConfigurationStateMachine::new(GraphKind::OneToOne);
        assert!(!machine.do_state_transition(State::MapKeys));
        assert!(machine.do_state_transition(State::Pairing));
        assert!(!machine.do_state_transition(State::Pairing));
        assert!(machine.do_state_transition(State::Locked));
    }

    #[test]
    fn test_error_state_is_terminal() {
        let mut machine = ConfigurationStateMachine::new(GraphKind::Set);
        let failed: Result<()> = machine.catch_error_state(|m| {
            m.do_state_transition(State::SetElements);
            Err(BuilderError::EmptyText("description"))
        });
        assert!(failed.is_err());
        assert_eq!(machine.current_state(), State::Errored);

        let later = machine.catch_error_state(|_| Ok(()));
        assert_eq!(later, Err(BuilderError::Dead));
        assert!(!machine.do_state_transition(State::SetElements));
    }
}
