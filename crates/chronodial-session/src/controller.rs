//! Call session controller managing the full call lifecycle.
//!
//! The `CallController` owns the single process-lifetime call session:
//! dialed-input editing, year resolution against the directory, opening
//! and tearing down sessions with the external voice service, and intake
//! of the service's events. All failure paths recover to Idle on a
//! bounded timer; nothing is fatal.
//!
//! Timers (duration ticker, error recovery) are armed on state entry and
//! implicitly disarmed on exit: every transition advances an epoch
//! counter, and a timer callback whose captured epoch no longer matches
//! is a no-op. The current-state check inside each callback is the second
//! line of defense.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tokio::sync::broadcast;

use chronodial_core::config::CallConfig;
use chronodial_core::error::Result;
use chronodial_core::events::{CallEvent, FailureKind};
use chronodial_core::ChronodialError;
use chronodial_directory::{Directory, PersonaRecord, KEY_LEN};

use crate::capture::CaptureSource;
use crate::state::{CallState, StateMachine};
use crate::voice::{SessionEvent, SessionHandle, TransportKind, VoiceConversationService};

/// Capacity of the controller's UI event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Recovery delays for the two error flavors.
#[derive(Debug, Clone, Copy)]
pub struct CallTiming {
    /// How long an invalid-year error is displayed before clearing.
    pub invalid_year_delay: Duration,
    /// How long a connection/mid-call failure is displayed before clearing.
    pub failure_delay: Duration,
}

impl Default for CallTiming {
    fn default() -> Self {
        Self {
            invalid_year_delay: Duration::from_millis(1_500),
            failure_delay: Duration::from_millis(2_000),
        }
    }
}

impl From<&CallConfig> for CallTiming {
    fn from(config: &CallConfig) -> Self {
        Self {
            invalid_year_delay: Duration::from_millis(config.invalid_year_delay_ms),
            failure_delay: Duration::from_millis(config.failure_delay_ms),
        }
    }
}

/// Mutable per-call data. Status lives in the state machine.
#[derive(Debug, Default)]
struct SessionBody {
    active_persona: Option<PersonaRecord>,
    duration_seconds: u64,
    is_remote_speaking: bool,
    dialed_input: String,
}

/// A consistent public view of the call session for the UI layer.
#[derive(Debug, Clone)]
pub struct CallSnapshot {
    pub status: CallState,
    pub active_persona: Option<PersonaRecord>,
    pub duration_seconds: u64,
    pub is_remote_speaking: bool,
    pub dialed_input: String,
}

/// The call controller. One instance per process; sessions are reset to
/// their initial Idle values between calls, never recreated.
pub struct CallController {
    directory: Arc<Directory>,
    voice: Arc<dyn VoiceConversationService>,
    capture: Arc<dyn CaptureSource>,
    machine: StateMachine,
    body: Arc<Mutex<SessionBody>>,
    handle: Arc<Mutex<Option<SessionHandle>>>,
    /// Bumped on every state transition. Timer tasks capture the value at
    /// arm time; a mismatch at fire time means the owning state ended.
    epoch: Arc<AtomicU64>,
    timing: CallTiming,
    transport: TransportKind,
    events_tx: broadcast::Sender<CallEvent>,
}

impl CallController {
    pub fn new(
        directory: Arc<Directory>,
        voice: Arc<dyn VoiceConversationService>,
        capture: Arc<dyn CaptureSource>,
        timing: CallTiming,
        transport: TransportKind,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            directory,
            voice,
            capture,
            machine: StateMachine::new(),
            body: Arc::new(Mutex::new(SessionBody::default())),
            handle: Arc::new(Mutex::new(None)),
            epoch: Arc::new(AtomicU64::new(0)),
            timing,
            transport,
            events_tx,
        }
    }

    /// Subscribe to the controller's UI event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events_tx.subscribe()
    }

    /// Current call status.
    pub fn status(&self) -> CallState {
        self.machine.current()
    }

    /// A copy of the full session state.
    pub fn snapshot(&self) -> CallSnapshot {
        let body = self.body.lock().expect("session mutex poisoned");
        CallSnapshot {
            status: self.machine.current(),
            active_persona: body.active_persona.clone(),
            duration_seconds: body.duration_seconds,
            is_remote_speaking: body.is_remote_speaking,
            dialed_input: body.dialed_input.clone(),
        }
    }

    fn emit(&self, event: CallEvent) {
        let _ = self.events_tx.send(event);
    }

    fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    // -------------------------------------------------------------------------
    // Dialed-input editing (Idle only)
    // -------------------------------------------------------------------------

    /// Append a digit to the dialed input. Ignored unless Idle and under
    /// the 4-character limit; ignored for non-digit characters.
    pub fn press_digit(&self, digit: char) {
        if self.machine.current() != CallState::Idle || !digit.is_ascii_digit() {
            return;
        }
        let mut body = self.body.lock().expect("session mutex poisoned");
        if body.dialed_input.len() >= KEY_LEN {
            return;
        }
        body.dialed_input.push(digit);
        let input = body.dialed_input.clone();
        drop(body);
        self.emit(CallEvent::DialedInputChanged { input });
    }

    /// Delete the last dialed character. Ignored unless Idle.
    pub fn delete_digit(&self) {
        if self.machine.current() != CallState::Idle {
            return;
        }
        let mut body = self.body.lock().expect("session mutex poisoned");
        if body.dialed_input.pop().is_none() {
            return;
        }
        let input = body.dialed_input.clone();
        drop(body);
        self.emit(CallEvent::DialedInputChanged { input });
    }

    /// Clear the entire dialed input. Ignored unless Idle.
    pub fn clear_input(&self) {
        if self.machine.current() != CallState::Idle {
            return;
        }
        let mut body = self.body.lock().expect("session mutex poisoned");
        if body.dialed_input.is_empty() {
            return;
        }
        body.dialed_input.clear();
        drop(body);
        self.emit(CallEvent::DialedInputChanged {
            input: String::new(),
        });
    }

    /// Replace the dialed input with a directory key drawn uniformly at
    /// random. Unprovisioned years are included in the draw; dialing one
    /// takes the not-provisioned failure path. Ignored unless Idle.
    pub fn randomize_input(&self) {
        if self.machine.current() != CallState::Idle {
            return;
        }
        let keys: Vec<&str> = self.directory.keys().collect();
        if keys.is_empty() {
            return;
        }
        let pick = keys[rand::rng().random_range(0..keys.len())].to_string();
        {
            let mut body = self.body.lock().expect("session mutex poisoned");
            body.dialed_input = pick.clone();
        }
        self.emit(CallEvent::DialedInputChanged { input: pick });
    }

    // -------------------------------------------------------------------------
    // Call lifecycle
    // -------------------------------------------------------------------------

    /// Place a call to the currently dialed year.
    ///
    /// Preconditions: Idle, 4 digits dialed. On a directory miss or any
    /// connection failure the controller transitions to Error, signals the
    /// UI, and recovers to Idle on a timer; the returned error mirrors
    /// what already happened and needs no handling beyond logging.
    pub async fn place_call(&self) -> Result<()> {
        if self.machine.current() != CallState::Idle {
            return Err(ChronodialError::Call(format!(
                "Cannot place a call while {}",
                self.machine.current()
            )));
        }

        let dialed = {
            let body = self.body.lock().expect("session mutex poisoned");
            body.dialed_input.clone()
        };
        if dialed.len() != KEY_LEN {
            return Err(ChronodialError::Call(format!(
                "A call needs {} digits, got {}",
                KEY_LEN,
                dialed.len()
            )));
        }

        let persona = match self.directory.lookup(&dialed) {
            Some(p) => p.clone(),
            None => {
                tracing::info!(year = %dialed, "Dialed year has no directory entry");
                self.fail_dial(&dialed);
                return Err(ChronodialError::InvalidYear(dialed));
            }
        };

        // Year resolved: enter Connecting and remember this attempt.
        self.machine.transition(CallState::Connecting)?;
        let attempt = self.advance_epoch();
        {
            let mut body = self.body.lock().expect("session mutex poisoned");
            body.active_persona = Some(persona.clone());
            body.duration_seconds = 0;
            body.is_remote_speaking = false;
        }
        tracing::info!(year = %dialed, persona = %persona.display_name, "Placing call");
        self.emit(CallEvent::CallPlaced {
            year: dialed.clone(),
            persona: persona.display_name.clone(),
        });

        // An entry without an agent id cannot take a call; fail before
        // touching the microphone or the service.
        if !persona.is_provisioned() {
            self.fail_attempt(
                attempt,
                FailureKind::NotProvisioned,
                format!("{} has no agent id configured", dialed),
            )
            .await;
            return Err(ChronodialError::NotProvisioned(dialed));
        }

        if let Err(e) = self.capture.request_capture().await {
            self.fail_attempt(attempt, FailureKind::PermissionDenied, e.to_string())
                .await;
            return Err(e);
        }

        if !self.attempt_live(attempt) {
            // Hung up while the permission prompt was open.
            self.capture.release().await;
            return Ok(());
        }

        match self
            .voice
            .open_session(&persona.agent_id, self.transport)
            .await
        {
            Ok(handle) => {
                if !self.attempt_live(attempt) {
                    // Hung up while the session request was in flight.
                    if let Err(e) = self.voice.close_session(handle).await {
                        tracing::warn!(error = %e, "Failed to close orphaned session");
                    }
                    self.capture.release().await;
                    return Ok(());
                }
                *self.handle.lock().expect("handle mutex poisoned") = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.fail_attempt(attempt, FailureKind::SessionOpen, e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// Hang up. Allowed from any state; idempotent.
    ///
    /// The remote close is best-effort: a failure is logged, never
    /// surfaced, and never prevents the local reset.
    pub async fn end_call(&self) {
        let handle = self.handle.lock().expect("handle mutex poisoned").take();
        if let Some(h) = handle {
            if let Err(e) = self.voice.close_session(h).await {
                tracing::warn!(error = %e, "Failed to close voice session; resetting locally anyway");
            }
        }
        self.capture.release().await;

        let previous = self.machine.current();
        if previous != CallState::Idle {
            if let Err(e) = self.machine.transition(CallState::Idle) {
                tracing::warn!(error = %e, "Hangup transition rejected");
            }
        }
        self.advance_epoch();

        let duration = {
            let mut body = self.body.lock().expect("session mutex poisoned");
            let duration = body.duration_seconds;
            body.active_persona = None;
            body.duration_seconds = 0;
            body.is_remote_speaking = false;
            body.dialed_input.clear();
            duration
        };

        if previous != CallState::Idle {
            tracing::info!(duration_secs = duration, "Call ended");
            self.emit(CallEvent::CallEnded {
                duration_secs: duration,
            });
        }
    }

    // -------------------------------------------------------------------------
    // Event intake from the external service
    // -------------------------------------------------------------------------

    /// Apply one event from the external service's stream.
    pub async fn handle_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => self.on_remote_connected(),
            SessionEvent::Disconnected => self.on_remote_disconnected().await,
            SessionEvent::Error { detail } => self.on_remote_error(detail).await,
            SessionEvent::RemoteAudioActivity { speaking } => self.on_remote_audio(speaking),
        }
    }

    fn on_remote_connected(&self) {
        if self.machine.current() != CallState::Connecting {
            tracing::debug!("Ignoring connected event outside Connecting");
            return;
        }
        if self.machine.transition(CallState::Connected).is_err() {
            return;
        }
        let attempt = self.advance_epoch();

        let persona = {
            let mut body = self.body.lock().expect("session mutex poisoned");
            body.duration_seconds = 0;
            body.active_persona
                .as_ref()
                .map(|p| p.display_name.clone())
                .unwrap_or_default()
        };
        tracing::info!(persona = %persona, "Call connected");
        self.emit(CallEvent::CallConnected { persona });
        self.arm_duration_ticker(attempt);
    }

    async fn on_remote_disconnected(&self) {
        // Only an established call reacts to a disconnect. During
        // Connecting the in-flight attempt owns its own error path, and in
        // Error the recovery timer does; a stale disconnect must not
        // clobber either.
        if self.machine.current() != CallState::Connected {
            tracing::debug!("Ignoring disconnect event outside Connected");
            return;
        }

        // The remote side is already gone; just drop the handle.
        self.handle.lock().expect("handle mutex poisoned").take();
        self.capture.release().await;

        if self.machine.transition(CallState::Idle).is_err() {
            return;
        }
        self.advance_epoch();

        let duration = {
            let mut body = self.body.lock().expect("session mutex poisoned");
            let duration = body.duration_seconds;
            body.active_persona = None;
            body.duration_seconds = 0;
            body.is_remote_speaking = false;
            duration
        };
        tracing::info!(duration_secs = duration, "Remote side ended the call");
        self.emit(CallEvent::CallEnded {
            duration_secs: duration,
        });
    }

    async fn on_remote_error(&self, detail: String) {
        let state = self.machine.current();
        if state != CallState::Connecting && state != CallState::Connected {
            tracing::debug!(detail = %detail, "Ignoring remote error outside a call");
            return;
        }

        // Quota/credit markers mean the operator's account is exhausted;
        // that must not be presented as a wrong year.
        let lowered = detail.to_lowercase();
        let kind = if lowered.contains("quota") || lowered.contains("credit") {
            FailureKind::ServiceExhausted
        } else {
            FailureKind::RemoteSession
        };

        let handle = self.handle.lock().expect("handle mutex poisoned").take();
        if let Some(h) = handle {
            if let Err(e) = self.voice.close_session(h).await {
                tracing::warn!(error = %e, "Failed to close errored session");
            }
        }
        self.capture.release().await;

        if self.machine.transition(CallState::Error).is_err() {
            return;
        }
        self.advance_epoch();
        {
            let mut body = self.body.lock().expect("session mutex poisoned");
            body.active_persona = None;
            body.is_remote_speaking = false;
        }

        tracing::warn!(kind = %kind, detail = %detail, "Remote session error");
        self.emit(CallEvent::CallFailed { kind, detail });
        self.emit(CallEvent::ShakeRequested);
        self.arm_recovery(self.timing.failure_delay);
    }

    fn on_remote_audio(&self, speaking: bool) {
        if self.machine.current() != CallState::Connected {
            return;
        }
        {
            let mut body = self.body.lock().expect("session mutex poisoned");
            if body.is_remote_speaking == speaking {
                return;
            }
            body.is_remote_speaking = speaking;
        }
        self.emit(CallEvent::RemoteSpeakingChanged { speaking });
    }

    // -------------------------------------------------------------------------
    // Failure paths and timers
    // -------------------------------------------------------------------------

    fn attempt_live(&self, attempt: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == attempt
            && self.machine.current() == CallState::Connecting
    }

    /// Invalid year: Idle -> Error, dialed input preserved so the user can
    /// see what they mis-dialed.
    fn fail_dial(&self, year: &str) {
        if self.machine.transition(CallState::Error).is_err() {
            return;
        }
        self.advance_epoch();
        self.emit(CallEvent::CallFailed {
            kind: FailureKind::InvalidYear,
            detail: format!("no persona answers at {}", year),
        });
        self.emit(CallEvent::ShakeRequested);
        self.arm_recovery(self.timing.invalid_year_delay);
    }

    /// Connect-attempt failure: Connecting -> Error, persona cleared,
    /// capture released.
    async fn fail_attempt(&self, attempt: u64, kind: FailureKind, detail: String) {
        self.capture.release().await;
        if !self.attempt_live(attempt) || self.machine.transition(CallState::Error).is_err() {
            return;
        }
        self.advance_epoch();
        {
            let mut body = self.body.lock().expect("session mutex poisoned");
            body.active_persona = None;
            body.is_remote_speaking = false;
        }
        tracing::warn!(kind = %kind, detail = %detail, "Call attempt failed");
        self.emit(CallEvent::CallFailed { kind, detail });
        self.emit(CallEvent::ShakeRequested);
        self.arm_recovery(self.timing.failure_delay);
    }

    /// Arm the Error -> Idle recovery timer for the current error state.
    fn arm_recovery(&self, delay: Duration) {
        let machine = self.machine.clone();
        let epoch = Arc::clone(&self.epoch);
        let body = Arc::clone(&self.body);
        let events_tx = self.events_tx.clone();
        let armed_at = epoch.load(Ordering::SeqCst);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A leaked timer whose state already ended must do nothing.
            if epoch.load(Ordering::SeqCst) != armed_at
                || machine.current() != CallState::Error
            {
                return;
            }
            if machine.transition(CallState::Idle).is_err() {
                return;
            }
            epoch.fetch_add(1, Ordering::SeqCst);
            {
                let mut body = body.lock().expect("session mutex poisoned");
                body.duration_seconds = 0;
                body.is_remote_speaking = false;
            }
            tracing::debug!("Error state cleared back to Idle");
            let _ = events_tx.send(CallEvent::ReturnedToIdle);
        });
    }

    /// Arm the once-per-second duration ticker for the current Connected
    /// state.
    fn arm_duration_ticker(&self, attempt: u64) {
        let machine = self.machine.clone();
        let epoch = Arc::clone(&self.epoch);
        let body = Arc::clone(&self.body);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if epoch.load(Ordering::SeqCst) != attempt
                    || machine.current() != CallState::Connected
                {
                    return;
                }
                let mut body = body.lock().expect("session mutex poisoned");
                body.duration_seconds += 1;
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
