use thiserror::Error;

/// Top-level error type for the Chronodial system.
///
/// Each call-failure category gets its own variant so the session
/// controller and the UI layer can tell an invalid year apart from an
/// operator problem (exhausted service credits) without string matching.
/// Every call-path variant is recoverable: the state machine returns to
/// Idle on a bounded timer regardless of which one fired.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChronodialError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No directory entry for year {0}")]
    InvalidYear(String),

    #[error("Persona for year {0} has no provisioned agent")]
    NotProvisioned(String),

    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to open voice session: {0}")]
    SessionOpen(String),

    #[error("Voice service exhausted: {0}")]
    ServiceExhausted(String),

    #[error("Remote session error: {0}")]
    RemoteSession(String),

    #[error("Failed to close voice session: {0}")]
    Hangup(String),

    #[error("Call error: {0}")]
    Call(String),

    #[error("Provisioning error: {0}")]
    Provision(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ChronodialError {
    fn from(err: toml::de::Error) -> Self {
        ChronodialError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ChronodialError {
    fn from(err: toml::ser::Error) -> Self {
        ChronodialError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChronodialError {
    fn from(err: serde_json::Error) -> Self {
        ChronodialError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Chronodial operations.
pub type Result<T> = std::result::Result<T, ChronodialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChronodialError::InvalidYear("1234".to_string());
        assert_eq!(err.to_string(), "No directory entry for year 1234");
    }

    #[test]
    fn test_error_display_call_variants() {
        let cases: Vec<(ChronodialError, &str)> = vec![
            (
                ChronodialError::NotProvisioned("0044".to_string()),
                "Persona for year 0044 has no provisioned agent",
            ),
            (
                ChronodialError::PermissionDenied("user refused".to_string()),
                "Microphone permission denied: user refused",
            ),
            (
                ChronodialError::SessionOpen("transport down".to_string()),
                "Failed to open voice session: transport down",
            ),
            (
                ChronodialError::ServiceExhausted("quota reached".to_string()),
                "Voice service exhausted: quota reached",
            ),
            (
                ChronodialError::RemoteSession("stream dropped".to_string()),
                "Remote session error: stream dropped",
            ),
            (
                ChronodialError::Hangup("timeout".to_string()),
                "Failed to close voice session: timeout",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChronodialError = io_err.into();
        assert!(matches!(err, ChronodialError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(parsed.is_err());
        let err: ChronodialError = parsed.unwrap_err().into();
        assert!(matches!(err, ChronodialError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(parsed.is_err());
        let err: ChronodialError = parsed.unwrap_err().into();
        assert!(matches!(err, ChronodialError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = ChronodialError::Call("bad transition".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Call"));
        assert!(debug_str.contains("bad transition"));
    }
}
