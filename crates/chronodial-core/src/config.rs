use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Chronodial application.
///
/// Loaded from `~/.chronodial/config.toml` by default. Each section
/// corresponds to one subsystem; every field has a default so a partial
/// (or absent) file still yields a working configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronodialConfig {
    pub general: GeneralConfig,
    pub call: CallConfig,
    pub directory: DirectoryConfig,
    pub provision: ProvisionConfig,
}

impl ChronodialConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChronodialConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Call-session timing and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Delay before an invalid-year error clears back to idle, in ms.
    pub invalid_year_delay_ms: u64,
    /// Delay before a connection-failure error clears back to idle, in ms.
    pub failure_delay_ms: u64,
    /// Transport requested when opening a voice session: "webrtc" or "websocket".
    pub transport: String,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            invalid_year_delay_ms: 1_500,
            failure_delay_ms: 2_000,
            transport: "webrtc".to_string(),
        }
    }
}

/// Directory configuration: external agent ids keyed by year.
///
/// A year missing from this map (and from the `AGENT_ID_<year>` environment)
/// resolves to an empty string, which the directory treats as "entry exists
/// but is not provisioned" rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Year key -> external agent identifier.
    pub agents: HashMap<String, String>,
}

/// Persona provisioning tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Base URL of the external conversational-voice API.
    pub api_base: String,
    /// Delay between successive agent-creation requests, in ms.
    pub request_delay_ms: u64,
    /// TTS model id to configure on each created agent.
    pub tts_model: String,
    /// Conversation language code.
    pub language: String,
    /// File the generated `AGENT_ID_<year>=<id>` lines are written to.
    pub output_file: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.elevenlabs.io".to_string(),
            request_delay_ms: 500,
            tts_model: "eleven_turbo_v2".to_string(),
            language: "en".to_string(),
            output_file: ".env.agents".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChronodialConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.call.invalid_year_delay_ms, 1_500);
        assert_eq!(config.call.failure_delay_ms, 2_000);
        assert_eq!(config.call.transport, "webrtc");
        assert!(config.directory.agents.is_empty());
        assert_eq!(config.provision.request_delay_ms, 500);
        assert_eq!(config.provision.tts_model, "eleven_turbo_v2");
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = ChronodialConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.call.invalid_year_delay_ms, 1_500);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ChronodialConfig::default();
        config.call.failure_delay_ms = 3_000;
        config
            .directory
            .agents
            .insert("1945".to_string(), "agent-abc".to_string());
        config.save(&path).unwrap();

        let loaded = ChronodialConfig::load(&path).unwrap();
        assert_eq!(loaded.call.failure_delay_ms, 3_000);
        assert_eq!(
            loaded.directory.agents.get("1945").map(String::as_str),
            Some("agent-abc")
        );
        // Untouched sections keep their defaults.
        assert_eq!(loaded.provision.language, "en");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let partial = r#"
            [call]
            invalid_year_delay_ms = 100
        "#;
        let config: ChronodialConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.call.invalid_year_delay_ms, 100);
        // Unspecified fields in the same section still default.
        assert_eq!(config.call.failure_delay_ms, 2_000);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [[[ toml").unwrap();

        assert!(ChronodialConfig::load(&path).is_err());
        // load_or_default absorbs the parse failure.
        let config = ChronodialConfig::load_or_default(&path);
        assert_eq!(config.call.transport, "webrtc");
    }
}
