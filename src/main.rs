use anyhow::Context;
use engagement::engine::{EventRecorder, SystemClock};
use engagement::prefs::JsonFilePreferenceStore;
use engagement::telemetry::TracingSink;
use engagement::EngineConfig;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE_PATH: &str = "engagement-prefs.json";
const DEFAULT_TICK_SECS: u64 = 3600;

/// One line of stdin. Stands in for the feature call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Enable,
    Disable,
    Chat,
    Prompt,
    OmniboxOpen,
    OmniboxQuery,
    SidebarOpen,
    Tick,
    Status,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "enable" => Some(Command::Enable),
        "disable" => Some(Command::Disable),
        "chat" => Some(Command::Chat),
        "prompt" => Some(Command::Prompt),
        "omnibox-open" => Some(Command::OmniboxOpen),
        "omnibox-query" => Some(Command::OmniboxQuery),
        "sidebar-open" => Some(Command::SidebarOpen),
        "tick" => Some(Command::Tick),
        "status" => Some(Command::Status),
        _ => None,
    }
}

fn dispatch(recorder: &mut EventRecorder, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Enable => recorder.record_enabled(true),
        Command::Disable => recorder.record_enabled(false),
        Command::Chat => recorder.record_new_chat(),
        Command::Prompt => recorder.record_new_prompt(),
        Command::OmniboxOpen => recorder.record_omnibox_open(),
        Command::OmniboxQuery => recorder.record_omnibox_search_query(),
        Command::SidebarOpen => recorder.handle_open_via_sidebar(),
        Command::Tick => recorder.tick(),
        Command::Status => {
            let status = serde_json::to_string_pretty(&recorder.status())?;
            println!("{}", status);
        }
    }
    Ok(())
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging/tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = env_path("ENGAGEMENT_CONFIG");
    let config = EngineConfig::load(config_path.as_deref()).context("loading engine config")?;

    let store_path = env_path("ENGAGEMENT_STORE").unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    let store = JsonFilePreferenceStore::open(store_path.clone())
        .with_context(|| format!("opening preference store {}", store_path.display()))?;

    let tick_secs = std::env::var("ENGAGEMENT_TICK_SECS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TICK_SECS);

    let mut recorder = EventRecorder::new(config, SystemClock, store, TracingSink);
    tracing::info!(store = %store_path.display(), tick_secs, "engagement host ready, reading commands from stdin");

    let mut cadence = interval(Duration::from_secs(tick_secs));
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cadence.tick() => recorder.tick(),
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(command) => dispatch(&mut recorder, command)?,
                    None => tracing::warn!(line = %line.trim(), "unknown command"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
