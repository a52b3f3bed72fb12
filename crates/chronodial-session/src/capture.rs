//! Microphone capture permission source.
//!
//! The host environment owns the microphone; the controller only asks for
//! capture before opening a session and releases it on every exit path.
//! At most one capture grant exists at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chronodial_core::error::{ChronodialError, Result};

/// Source of microphone capture grants.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Request audio capture from the host.
    ///
    /// Returns `Ok(())` on grant, `ChronodialError::PermissionDenied` on
    /// refusal.
    async fn request_capture(&self) -> Result<()>;

    /// Stop capture. Idempotent; never fails.
    async fn release(&self);

    /// Whether capture is currently held.
    fn is_active(&self) -> bool;
}

/// Mock capture source for tests and transports without real audio.
///
/// Configured to either grant or deny every request. Tracks the active
/// grant via an atomic flag so it is fully thread-safe.
#[derive(Debug, Clone)]
pub struct MockCaptureSource {
    grant: bool,
    active: Arc<AtomicBool>,
}

impl MockCaptureSource {
    /// A source that grants every request.
    pub fn granting() -> Self {
        Self {
            grant: true,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A source that denies every request.
    pub fn denying() -> Self {
        Self {
            grant: false,
            active: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl CaptureSource for MockCaptureSource {
    async fn request_capture(&self) -> Result<()> {
        if !self.grant {
            return Err(ChronodialError::PermissionDenied(
                "microphone access refused".to_string(),
            ));
        }
        if self.active.swap(true, Ordering::Relaxed) {
            return Err(ChronodialError::Call(
                "microphone capture is already active".to_string(),
            ));
        }
        tracing::debug!("Mock capture granted");
        Ok(())
    }

    async fn release(&self) {
        if self.active.swap(false, Ordering::Relaxed) {
            tracing::debug!("Mock capture released");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_granting_source() {
        let source = MockCaptureSource::granting();
        assert!(!source.is_active());

        source.request_capture().await.unwrap();
        assert!(source.is_active());

        source.release().await;
        assert!(!source.is_active());
    }

    #[tokio::test]
    async fn test_denying_source() {
        let source = MockCaptureSource::denying();
        let result = source.request_capture().await;
        assert!(matches!(result, Err(ChronodialError::PermissionDenied(_))));
        assert!(!source.is_active());
    }

    #[tokio::test]
    async fn test_double_request_is_error() {
        let source = MockCaptureSource::granting();
        source.request_capture().await.unwrap();
        assert!(source.request_capture().await.is_err());
        // The grant itself is still held.
        assert!(source.is_active());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let source = MockCaptureSource::granting();
        source.request_capture().await.unwrap();
        source.release().await;
        source.release().await;
        assert!(!source.is_active());

        // Re-acquisition after release works.
        source.request_capture().await.unwrap();
        assert!(source.is_active());
    }
}
