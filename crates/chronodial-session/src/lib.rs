//! Chronodial Session crate - call state machine, session controller, and
//! the seams to the external voice service and microphone.
//!
//! The controller drives a single call session through a strict state
//! machine: Idle -> Connecting -> Connected, with Error as the recoverable
//! failure state that clears back to Idle on a timer. The external
//! conversational-voice platform and the microphone permission source are
//! consumed through narrow trait interfaces so they can be swapped for
//! simulated implementations in tests and offline runs.

pub mod capture;
pub mod controller;
pub mod state;
pub mod voice;

pub use capture::{CaptureSource, MockCaptureSource};
pub use controller::{CallController, CallSnapshot, CallTiming};
pub use state::{CallState, StateMachine};
pub use voice::{
    SessionEvent, SessionHandle, SimulatedVoiceService, TransportKind, VoiceConversationService,
};
