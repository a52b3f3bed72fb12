//! Call state machine with thread-safe transitions.
//!
//! Enforces valid state transitions for the call lifecycle:
//! - Idle -> Connecting (place call, year resolved)
//! - Idle -> Error (place call, year not in directory)
//! - Connecting -> Connected (remote confirmed)
//! - Connecting -> Error (permission denied / session open failed)
//! - Connecting -> Idle (hang up during connect)
//! - Connected -> Idle (hang up or remote disconnect)
//! - Connected -> Error (remote session error)
//! - Error -> Idle (recovery timeout, or local hangup reset)

use std::fmt;
use std::sync::{Arc, Mutex};

use chronodial_core::error::ChronodialError;

/// Status of the single call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// No call in progress. Dialed input may be edited.
    Idle,
    /// A call attempt is in flight: permission requested, session opening.
    Connecting,
    /// The external service confirmed the session; audio is live.
    Connected,
    /// A failure occurred; the state clears back to Idle on a timer.
    Error,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Idle => write!(f, "Idle"),
            CallState::Connecting => write!(f, "Connecting"),
            CallState::Connected => write!(f, "Connected"),
            CallState::Error => write!(f, "Error"),
        }
    }
}

impl CallState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CallState) -> bool {
        matches!(
            (self, target),
            (CallState::Idle, CallState::Connecting)
                | (CallState::Idle, CallState::Error)
                | (CallState::Connecting, CallState::Connected)
                | (CallState::Connecting, CallState::Error)
                | (CallState::Connecting, CallState::Idle)
                | (CallState::Connected, CallState::Idle)
                | (CallState::Connected, CallState::Error)
                | (CallState::Error, CallState::Idle)
        )
    }
}

/// Thread-safe state machine for call state transitions.
///
/// Wraps `CallState` in an `Arc<Mutex<>>` so the controller, its timer
/// tasks, and the event-intake path all observe one consistent state.
/// Transitions are validated before being applied.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: Arc<Mutex<CallState>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CallState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> CallState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    ///
    /// Returns `Ok(())` if the transition is valid, or a
    /// `ChronodialError::Call` if it is not allowed from the current state.
    pub fn transition(&self, target: CallState) -> Result<(), ChronodialError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Call state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(ChronodialError::Call(format!(
                "Invalid state transition: {} -> {}",
                *state, target
            )))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
