//! Chronodial application binary - composition root.
//!
//! Ties the crates together into a runnable phone:
//! 1. Load configuration from TOML
//! 2. Build the persona directory (config agent ids + AGENT_ID_<year> env)
//! 3. Wire the call controller to the simulated voice service
//! 4. Forward service events into the controller
//! 5. Drive the keypad from stdin and print UI signals as they arrive
//!
//! The graphical front end is out of scope; this loop is the minimal
//! reactive consumer of the controller's state and event stream.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use chronodial_core::config::ChronodialConfig;
use chronodial_core::events::{CallEvent, FailureKind};
use chronodial_directory::{agent_ids_from_env, Directory};
use chronodial_session::{
    CallController, CallState, CallTiming, MockCaptureSource, SimulatedVoiceService, TransportKind,
    VoiceConversationService,
};

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

/// Merge config-file agent ids with `AGENT_ID_<year>` env overrides.
fn resolve_agent_ids(config: &ChronodialConfig) -> HashMap<String, String> {
    let mut ids = config.directory.agents.clone();
    for (year, id) in agent_ids_from_env() {
        ids.insert(year, id);
    }
    ids
}

/// Render the keypad display line for the current session state.
fn display_line(controller: &CallController, directory: &Directory) -> String {
    let snapshot = controller.snapshot();
    match snapshot.status {
        CallState::Error => "ERA UNREACHABLE".to_string(),
        CallState::Connecting => match &snapshot.active_persona {
            Some(p) => format!("Reaching {}...", p.display_name),
            None => "CONNECTING...".to_string(),
        },
        CallState::Connected => match &snapshot.active_persona {
            Some(p) => format!(
                "{} [{}s]{}",
                p.display_name.to_uppercase(),
                snapshot.duration_seconds,
                if snapshot.is_remote_speaking {
                    " (speaking)"
                } else {
                    ""
                }
            ),
            None => "CONNECTED".to_string(),
        },
        CallState::Idle => {
            let padded: String = format!("{:_<4}", snapshot.dialed_input);
            match directory.hint(&snapshot.dialed_input) {
                Some(hint) => format!("{}  {}", padded, hint),
                None => padded,
            }
        }
    }
}

/// Print UI signals as they arrive from the controller.
async fn signal_printer(controller: Arc<CallController>) {
    let mut events = controller.subscribe();
    while let Ok(event) = events.recv().await {
        match event {
            CallEvent::DialedInputChanged { input } => {
                println!("  display: {:_<4}", input);
            }
            CallEvent::CallPlaced { year, persona } => {
                println!("  dialing {} ({})...", year, persona);
            }
            CallEvent::CallConnected { persona } => {
                println!("  connected to {}", persona);
            }
            CallEvent::CallEnded { duration_secs } => {
                println!("  call ended after {}s", duration_secs);
            }
            CallEvent::CallFailed { kind, detail } => {
                if kind == FailureKind::ServiceExhausted {
                    println!("  !! SERVICE CREDITS EXHAUSTED: {}", detail);
                    println!("  !! Check billing with the voice provider; redialing will not help.");
                } else {
                    println!("  era unreachable ({})", kind);
                }
            }
            CallEvent::ShakeRequested => {
                println!("  *shake*");
            }
            CallEvent::RemoteSpeakingChanged { speaking } => {
                if speaking {
                    println!("  ...remote is speaking...");
                }
            }
            CallEvent::ReturnedToIdle => {
                println!("  display cleared");
            }
            _ => {}
        }
    }
}

fn print_help() {
    println!("keys: 0-9 dial, * random year, # or 'call' place call");
    println!("      'del' delete digit, 'clear' clear display");
    println!("      'end' hang up, 'status' show session, 'quit' exit");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Chronodial v{}", env!("CARGO_PKG_VERSION"));

    let config_file = config_path();
    let config = ChronodialConfig::load_or_default(&config_file);

    let directory = Arc::new(Directory::with_agent_ids(&resolve_agent_ids(&config)));
    let transport: TransportKind = config.call.transport.parse()?;

    let voice = Arc::new(SimulatedVoiceService::new());
    let controller = Arc::new(CallController::new(
        Arc::clone(&directory),
        Arc::clone(&voice) as Arc<dyn VoiceConversationService>,
        Arc::new(MockCaptureSource::granting()),
        CallTiming::from(&config.call),
        transport,
    ));

    // Forward service events into the controller.
    let mut service_events = voice.events();
    let event_sink = Arc::clone(&controller);
    tokio::spawn(async move {
        while let Ok(event) = service_events.recv().await {
            event_sink.handle_session_event(event).await;
        }
    });

    // Print UI signals.
    tokio::spawn(signal_printer(Arc::clone(&controller)));

    println!("CHRONODIAL - dial a year, connect to history");
    print_help();

    use std::io::Write as _;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_help(),
            "status" => {
                let snapshot = controller.snapshot();
                println!(
                    "  {} | display {} | duration {}s",
                    snapshot.status,
                    display_line(&controller, &directory),
                    snapshot.duration_seconds
                );
            }
            "call" | "#" => {
                if let Err(e) = controller.place_call().await {
                    tracing::debug!(error = %e, "Call attempt rejected");
                }
            }
            "end" => controller.end_call().await,
            "del" => controller.delete_digit(),
            "clear" => controller.clear_input(),
            "*" => controller.randomize_input(),
            other => {
                for c in other.chars() {
                    match c {
                        '0'..='9' => controller.press_digit(c),
                        '*' => controller.randomize_input(),
                        '#' => {
                            if let Err(e) = controller.place_call().await {
                                tracing::debug!(error = %e, "Call attempt rejected");
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    // Leave any live session cleanly.
    controller.end_call().await;
    tracing::info!("Goodbye");
    Ok(())
}
