//! Abstract interface to the external conversational-voice service.
//!
//! The controller depends only on this narrow contract: open a session
//! bound to an agent id, close it, and consume the service's event stream.
//! Speech recognition, dialogue generation, and synthesis all happen on
//! the remote side; none of that leaks through this seam.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use chronodial_core::error::{ChronodialError, Result};

/// Capacity of the session event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Transport requested when opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    WebRtc,
    WebSocket,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::WebRtc => write!(f, "webrtc"),
            TransportKind::WebSocket => write!(f, "websocket"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = ChronodialError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "webrtc" => Ok(TransportKind::WebRtc),
            "websocket" => Ok(TransportKind::WebSocket),
            other => Err(ChronodialError::Config(format!(
                "Unknown transport kind: {}",
                other
            ))),
        }
    }
}

/// Opaque handle to an open session with the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Events emitted by the external service over the lifetime of a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session is established; audio is flowing.
    Connected,
    /// The remote side closed the session.
    Disconnected,
    /// The service reported an error. The payload is inspected for
    /// quota/credit markers to distinguish billing exhaustion from
    /// ordinary failures.
    Error { detail: String },
    /// The remote party started or stopped emitting audio.
    RemoteAudioActivity { speaking: bool },
}

/// The external real-time conversational-voice service.
///
/// `open_session` returning `Ok` means the request was accepted; the
/// actual confirmation arrives later as [`SessionEvent::Connected`] on the
/// event stream. Implementations must keep emitting events independently
/// of any open call so a UI can subscribe once at startup.
#[async_trait]
pub trait VoiceConversationService: Send + Sync {
    /// Request a real-time session bound to the given external agent id.
    async fn open_session(&self, agent_id: &str, transport: TransportKind)
        -> Result<SessionHandle>;

    /// Close a previously opened session. Best-effort on the remote side.
    async fn close_session(&self, handle: SessionHandle) -> Result<()>;

    /// Subscribe to the service's event stream.
    fn events(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Simulated voice service.
///
/// Stands in for the real platform when no transport is configured and in
/// tests: `open_session` confirms after a short delay by emitting
/// `Connected`, `close_session` emits `Disconnected`, and arbitrary events
/// can be injected to script failure scenarios.
#[derive(Debug)]
pub struct SimulatedVoiceService {
    events_tx: broadcast::Sender<SessionEvent>,
    connect_delay: Duration,
    refuse_open: AtomicBool,
    current: Mutex<Option<SessionHandle>>,
}

impl Default for SimulatedVoiceService {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedVoiceService {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events_tx,
            connect_delay: Duration::from_millis(300),
            refuse_open: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Override the simulated connect delay.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Make every subsequent `open_session` fail, simulating an
    /// unreachable platform.
    pub fn refuse_opens(&self, refuse: bool) {
        self.refuse_open.store(refuse, Ordering::Relaxed);
    }

    /// Inject an event into the stream, as the real service would.
    pub fn inject(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Handle of the currently open session, if any.
    pub fn current_session(&self) -> Option<SessionHandle> {
        *self.current.lock().expect("session mutex poisoned")
    }
}

#[async_trait]
impl VoiceConversationService for SimulatedVoiceService {
    async fn open_session(
        &self,
        agent_id: &str,
        transport: TransportKind,
    ) -> Result<SessionHandle> {
        if self.refuse_open.load(Ordering::Relaxed) {
            return Err(ChronodialError::SessionOpen(
                "simulated service refused the session".to_string(),
            ));
        }
        if agent_id.is_empty() {
            return Err(ChronodialError::SessionOpen(
                "agent id must not be empty".to_string(),
            ));
        }

        let handle = SessionHandle::new();
        *self.current.lock().expect("session mutex poisoned") = Some(handle);
        tracing::info!(agent_id = %agent_id, transport = %transport, session = %handle.id, "Simulated session opening");

        // Confirmation arrives asynchronously, like the real platform.
        let events_tx = self.events_tx.clone();
        let delay = self.connect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events_tx.send(SessionEvent::Connected);
        });

        Ok(handle)
    }

    async fn close_session(&self, handle: SessionHandle) -> Result<()> {
        let mut current = self.current.lock().expect("session mutex poisoned");
        match *current {
            Some(open) if open == handle => {
                *current = None;
                drop(current);
                tracing::info!(session = %handle.id, "Simulated session closed");
                let _ = self.events_tx.send(SessionEvent::Disconnected);
                Ok(())
            }
            _ => Err(ChronodialError::Hangup(format!(
                "no open session with handle {}",
                handle.id
            ))),
        }
    }

    fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_parse() {
        assert_eq!("webrtc".parse::<TransportKind>().unwrap(), TransportKind::WebRtc);
        assert_eq!(
            "websocket".parse::<TransportKind>().unwrap(),
            TransportKind::WebSocket
        );
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_transport_kind_display_round_trip() {
        for kind in [TransportKind::WebRtc, TransportKind::WebSocket] {
            assert_eq!(kind.to_string().parse::<TransportKind>().unwrap(), kind);
        }
    }

    #[tokio::test]
    async fn test_simulated_open_emits_connected() {
        let service = SimulatedVoiceService::new().with_connect_delay(Duration::from_millis(1));
        let mut events = service.events();

        let handle = service
            .open_session("agent-1", TransportKind::WebRtc)
            .await
            .unwrap();
        assert_eq!(service.current_session(), Some(handle));

        let event = events.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::Connected));
    }

    #[tokio::test]
    async fn test_simulated_open_rejects_empty_agent_id() {
        let service = SimulatedVoiceService::new();
        let result = service.open_session("", TransportKind::WebRtc).await;
        assert!(matches!(result, Err(ChronodialError::SessionOpen(_))));
        assert!(service.current_session().is_none());
    }

    #[tokio::test]
    async fn test_simulated_refuse_opens() {
        let service = SimulatedVoiceService::new();
        service.refuse_opens(true);
        let result = service.open_session("agent-1", TransportKind::WebRtc).await;
        assert!(matches!(result, Err(ChronodialError::SessionOpen(_))));

        service.refuse_opens(false);
        assert!(service
            .open_session("agent-1", TransportKind::WebRtc)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_simulated_close_emits_disconnected() {
        let service = SimulatedVoiceService::new().with_connect_delay(Duration::from_millis(1));
        let handle = service
            .open_session("agent-1", TransportKind::WebRtc)
            .await
            .unwrap();

        let mut events = service.events();
        service.close_session(handle).await.unwrap();
        assert!(service.current_session().is_none());

        let event = events.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_simulated_close_unknown_handle_is_error() {
        let service = SimulatedVoiceService::new();
        let result = service.close_session(SessionHandle::new()).await;
        assert!(matches!(result, Err(ChronodialError::Hangup(_))));
    }

    #[tokio::test]
    async fn test_inject_reaches_subscribers() {
        let service = SimulatedVoiceService::new();
        let mut events = service.events();
        service.inject(SessionEvent::Error {
            detail: "quota exceeded".to_string(),
        });
        match events.recv().await.unwrap() {
            SessionEvent::Error { detail } => assert_eq!(detail, "quota exceeded"),
            other => panic!("Expected Error event, got {:?}", other),
        }
    }
}
