//! Persona provisioning binary.
//!
//! Reads the API key from `ELEVENLABS_API_KEY`, creates one
//! conversational agent per persona in the roster, and writes the
//! resulting `AGENT_ID_<year>=<id>` lines to the configured env file.
//! Rerunnable: personas that fail one pass can be retried on the next.

use std::path::{Path, PathBuf};

use chronodial_core::config::ChronodialConfig;
use chronodial_provision::{provision_all, render_env_file, write_env_file, ProvisionClient};

/// Resolve the config file path (CHRONODIAL_CONFIG env, or
/// ~/.chronodial/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("CHRONODIAL_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".chronodial").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let api_key = match std::env::var("ELEVENLABS_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            tracing::error!("ELEVENLABS_API_KEY is not set; cannot provision agents");
            std::process::exit(1);
        }
    };

    let config = ChronodialConfig::load_or_default(&config_path());
    let client = ProvisionClient::new(config.provision.api_base.clone(), api_key);

    tracing::info!(api_base = %config.provision.api_base, "Starting provisioning pass");
    let provisioned = provision_all(&client, &config.provision).await;

    if provisioned.is_empty() {
        tracing::error!("No agents were created");
        std::process::exit(1);
    }

    let output = Path::new(&config.provision.output_file);
    write_env_file(output, &provisioned)?;

    // Echo the lines so they can be copied straight into a shell profile.
    println!("Add the following to your environment:");
    print!("{}", render_env_file(&provisioned));
    println!("(saved to {})", output.display());

    Ok(())
}
