//! HTTP client for the external service's agent-creation endpoint.

use serde::{Deserialize, Serialize};

use chronodial_core::error::{ChronodialError, Result};

use crate::characters::PersonaDefinition;
use crate::voices::voice_id_for;

/// Agent-creation endpoint path on the external API.
const AGENTS_CREATE_PATH: &str = "/v1/convai/agents/create";
/// Header carrying the API key.
const API_KEY_HEADER: &str = "xi-api-key";

/// Request body for agent creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub conversation_config: ConversationConfig,
    pub platform_settings: PlatformSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationConfig {
    pub agent: AgentConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub prompt: PromptConfig,
    pub first_message: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptConfig {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsConfig {
    pub model_id: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSettings {
    pub auth: AuthSettings,
}

/// Agents are created public so the front end can open sessions without
/// holding the API key.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSettings {
    pub enable_auth: bool,
}

#[derive(Debug, Deserialize)]
struct CreateAgentResponse {
    agent_id: String,
}

/// One successfully provisioned persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAgent {
    pub year: String,
    pub agent_id: String,
}

/// Build the creation payload for one persona.
pub fn creation_request(
    def: &PersonaDefinition,
    tts_model: &str,
    language: &str,
) -> CreateAgentRequest {
    CreateAgentRequest {
        name: format!("Chronodial - {}", def.name),
        conversation_config: ConversationConfig {
            agent: AgentConfig {
                prompt: PromptConfig {
                    prompt: def.prompt.to_string(),
                },
                first_message: def.first_message.to_string(),
                language: language.to_string(),
            },
            tts: TtsConfig {
                model_id: tts_model.to_string(),
                voice_id: voice_id_for(def.voice_style).to_string(),
            },
        },
        platform_settings: PlatformSettings {
            auth: AuthSettings { enable_auth: false },
        },
    }
}

/// Thin client over the agent-creation endpoint.
#[derive(Debug, Clone)]
pub struct ProvisionClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl ProvisionClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    /// Create one agent, returning its external id.
    pub async fn create_agent(
        &self,
        def: &PersonaDefinition,
        tts_model: &str,
        language: &str,
    ) -> Result<ProvisionedAgent> {
        let url = format!("{}{}", self.api_base, AGENTS_CREATE_PATH);
        let body = creation_request(def, tts_model, language);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChronodialError::Provision(format!("{}: {}", def.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChronodialError::Provision(format!(
                "{}: HTTP {} {}",
                def.name, status, detail
            )));
        }

        let parsed: CreateAgentResponse = response
            .json()
            .await
            .map_err(|e| ChronodialError::Provision(format!("{}: {}", def.name, e)))?;

        Ok(ProvisionedAgent {
            year: def.year.to_string(),
            agent_id: parsed.agent_id,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::CHARACTERS;

    #[test]
    fn test_creation_payload_shape() {
        let einstein = CHARACTERS
            .iter()
            .find(|d| d.year == "1945")
            .expect("Einstein in roster");
        let request = creation_request(einstein, "eleven_turbo_v2", "en");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["name"], "Chronodial - Albert Einstein");
        assert_eq!(
            value["conversation_config"]["agent"]["first_message"],
            einstein.first_message
        );
        assert_eq!(value["conversation_config"]["agent"]["language"], "en");
        assert!(value["conversation_config"]["agent"]["prompt"]["prompt"]
            .as_str()
            .unwrap()
            .contains("Einstein"));
        assert_eq!(
            value["conversation_config"]["tts"]["model_id"],
            "eleven_turbo_v2"
        );
        assert_eq!(
            value["conversation_config"]["tts"]["voice_id"],
            "bVMeCyTHy58xNoL34h3p"
        );
        assert_eq!(value["platform_settings"]["auth"]["enable_auth"], false);
    }

    #[test]
    fn test_unknown_voice_style_uses_default_in_payload() {
        let def = PersonaDefinition {
            year: "1234",
            name: "Test Persona",
            era: "Test Era",
            voice_style: "No Such Style",
            prompt: "prompt",
            first_message: "hello",
        };
        let value = serde_json::to_value(creation_request(&def, "m", "en")).unwrap();
        assert_eq!(
            value["conversation_config"]["tts"]["voice_id"],
            crate::voices::DEFAULT_VOICE_ID
        );
    }
}
