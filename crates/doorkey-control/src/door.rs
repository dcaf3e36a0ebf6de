//! Door position state machine.
//!
//! Tracks where the door is in its cycle and keeps a bounded history of
//! transitions, so that the cycle can be audited after the fact.
//!
//! # Valid Transitions
//!
//! `Closed → Opening → Open → Closing → Closed`, nothing else. Moving from
//! `Opening` to `Open` or from `Closing` to `Closed` is only done when the
//! phase timer expires.
//!
//! # Examples
//!
//! ```
//! use doorkey_control::DoorStateMachine;
//! use doorkey_core::DoorState;
//!
//! let mut door = DoorStateMachine::new();
//! door.transition_to(DoorState::Opening).unwrap();
//! assert!(door.transition_to(DoorState::Closing).is_err());
//!
//! door.advance().unwrap();
//! assert_eq!(door.current_state(), DoorState::Open);
//! ```

use std::collections::VecDeque;

use doorkey_core::{DoorState, Error, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

/// Maximum number of transitions kept in history.
///
/// One door cycle is four transitions, so this covers the last 16 cycles.
const MAX_HISTORY_SIZE: usize = 64;

/// A single door transition with timestamp.
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorTransition {
    pub from: DoorState,
    pub to: DoorState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl DoorTransition {
    pub fn new(from: DoorState, to: DoorState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub struct DoorStateMachine {
    current_state: DoorState,
    history: VecDeque<DoorTransition>,
}

impl DoorStateMachine {
    /// Create a machine for a closed door.
    pub fn new() -> Self {
        Self::with_initial_state(DoorState::Closed)
    }

    pub fn with_initial_state(state: DoorState) -> Self {
        Self {
            current_state: state,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> DoorState {
        self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<DoorTransition> {
        &self.history
    }

    /// States visited, starting from the oldest recorded transition.
    pub fn visited_states(&self) -> Vec<DoorState> {
        let mut states: Vec<DoorState> = self.history.iter().map(|t| t.to).collect();
        if let Some(first) = self.history.front() {
            states.insert(0, first.from);
        }
        states
    }

    /// Move to `new_state`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` unless `new_state` is the
    /// successor of the current state.
    pub fn transition_to(&mut self, new_state: DoorState) -> Result<DoorTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::transition(self.current_state, new_state));
        }

        let transition = DoorTransition::new(self.current_state, new_state);
        debug!(from = %transition.from, to = %transition.to, "Door transition");
        self.current_state = new_state;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        Ok(transition)
    }

    /// Move to the successor of the current state.
    pub fn advance(&mut self) -> Result<DoorTransition> {
        self.transition_to(self.current_state.successor())
    }
}

impl Default for DoorStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
