use serde::{Deserialize, Serialize};

/// Category of call failure, carried by [`CallEvent::CallFailed`].
///
/// `ServiceExhausted` is the one category a UI must present differently:
/// it is an operator/billing problem that redialing will not fix, unlike
/// every other kind, which collapses to a generic "unreachable" cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The dialed year has no directory entry.
    InvalidYear,
    /// The directory entry exists but carries no agent id.
    NotProvisioned,
    /// Microphone capture permission was refused.
    PermissionDenied,
    /// The external service rejected or failed to open the session.
    SessionOpen,
    /// The external service reported quota/credit depletion.
    ServiceExhausted,
    /// Any other mid-call error signaled by the external service.
    RemoteSession,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::InvalidYear => "invalid-year",
            FailureKind::NotProvisioned => "not-provisioned",
            FailureKind::PermissionDenied => "permission-denied",
            FailureKind::SessionOpen => "session-open",
            FailureKind::ServiceExhausted => "service-exhausted",
            FailureKind::RemoteSession => "remote-session",
        };
        write!(f, "{}", s)
    }
}

/// Domain events emitted by the call controller.
///
/// The presentation layer subscribes to these over a broadcast channel and
/// reacts (display updates, shake animation, exhausted-service notice)
/// instead of polling controller state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CallEvent {
    /// The dialed input buffer changed while idle.
    DialedInputChanged { input: String },

    /// A call attempt started; the session is now connecting.
    CallPlaced {
        year: String,
        persona: String,
    },

    /// The external service confirmed the connection.
    CallConnected { persona: String },

    /// The call ended (hangup or remote disconnect) and state reset to idle.
    CallEnded { duration_secs: u64 },

    /// A call attempt or active call failed.
    CallFailed {
        kind: FailureKind,
        detail: String,
    },

    /// The UI should play its invalid/shake effect.
    ShakeRequested,

    /// The remote party started or stopped speaking.
    RemoteSpeakingChanged { speaking: bool },

    /// An error state cleared back to idle after its recovery delay.
    ReturnedToIdle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::InvalidYear.to_string(), "invalid-year");
        assert_eq!(
            FailureKind::ServiceExhausted.to_string(),
            "service-exhausted"
        );
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = CallEvent::CallFailed {
            kind: FailureKind::SessionOpen,
            detail: "transport refused".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: CallEvent = serde_json::from_str(&json).unwrap();
        match back {
            CallEvent::CallFailed { kind, detail } => {
                assert_eq!(kind, FailureKind::SessionOpen);
                assert_eq!(detail, "transport refused");
            }
            _ => panic!("Expected CallFailed variant"),
        }
    }
}
