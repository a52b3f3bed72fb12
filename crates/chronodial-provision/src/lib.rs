//! Chronodial Provision crate - one-shot persona provisioning against the
//! external conversational-voice API.
//!
//! For each persona in the fixed roster, creates a conversational agent
//! via the service's HTTP API and collects the returned agent ids. A
//! failed persona is logged and skipped; partial success is the expected
//! outcome, not a fatal error. The results are rendered as
//! `AGENT_ID_<year>=<id>` lines, the format the directory reads back at
//! startup.

use std::path::Path;
use std::time::Duration;

use chronodial_core::config::ProvisionConfig;
use chronodial_core::error::Result;

pub mod characters;
pub mod client;
pub mod voices;

pub use characters::{PersonaDefinition, CHARACTERS};
pub use client::{creation_request, ProvisionClient, ProvisionedAgent};
pub use voices::{voice_id_for, DEFAULT_VOICE_ID};

/// Create an agent for every persona in the roster.
///
/// Personas that fail are logged and skipped. A fixed delay separates
/// successive requests to stay under the service's rate limits.
pub async fn provision_all(
    client: &ProvisionClient,
    config: &ProvisionConfig,
) -> Vec<ProvisionedAgent> {
    let mut provisioned = Vec::new();

    for (i, def) in CHARACTERS.iter().enumerate() {
        tracing::info!(year = %def.year, persona = %def.name, "Creating agent");
        match client
            .create_agent(def, &config.tts_model, &config.language)
            .await
        {
            Ok(agent) => {
                tracing::info!(year = %agent.year, agent_id = %agent.agent_id, "Agent created");
                provisioned.push(agent);
            }
            Err(e) => {
                tracing::warn!(persona = %def.name, error = %e, "Skipping persona");
            }
        }

        if i + 1 < CHARACTERS.len() {
            tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
        }
    }

    tracing::info!(
        created = provisioned.len(),
        total = CHARACTERS.len(),
        "Provisioning pass complete"
    );
    provisioned
}

/// Render provisioned agents as env-file lines.
pub fn render_env_file(agents: &[ProvisionedAgent]) -> String {
    let mut out = String::new();
    for agent in agents {
        out.push_str(&format!("AGENT_ID_{}={}\n", agent.year, agent.agent_id));
    }
    out
}

/// Write the env file the directory reads agent ids from.
pub fn write_env_file(path: &Path, agents: &[ProvisionedAgent]) -> Result<()> {
    std::fs::write(path, render_env_file(agents))?;
    tracing::info!(path = %path.display(), count = agents.len(), "Agent ids written");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<ProvisionedAgent> {
        vec![
            ProvisionedAgent {
                year: "0044".to_string(),
                agent_id: "agent-caesar".to_string(),
            },
            ProvisionedAgent {
                year: "1945".to_string(),
                agent_id: "agent-einstein".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_env_file() {
        let rendered = render_env_file(&agents());
        assert_eq!(
            rendered,
            "AGENT_ID_0044=agent-caesar\nAGENT_ID_1945=agent-einstein\n"
        );
    }

    #[test]
    fn test_render_env_file_empty() {
        assert_eq!(render_env_file(&[]), "");
    }

    #[test]
    fn test_write_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.agents");
        write_env_file(&path, &agents()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("AGENT_ID_1945=agent-einstein"));
        assert_eq!(content.lines().count(), 2);
    }
}
